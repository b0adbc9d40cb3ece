pub mod klaviyo;
pub mod shopify;

pub use klaviyo::*;
pub use shopify::*;
