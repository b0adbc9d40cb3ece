pub mod config;
pub mod encoding;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod submitter;
pub mod transformer;

pub use config::{Args, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use pipeline::SyncPipeline;
