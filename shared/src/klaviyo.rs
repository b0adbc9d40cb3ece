//! Track API payloads for the "Placed Order" and "Ordered Product" metrics.
//!
//! Optional values are always serialized, as `null` when absent, so every
//! payload of a given kind carries the same set of keys.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::shopify::DiscountCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "Placed Order")]
    PlacedOrder,
    #[serde(rename = "Ordered Product")]
    OrderedProduct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedOrderEvent {
    pub token: String,
    pub event: EventKind,
    pub customer_properties: CustomerProperties,
    pub properties: OrderProperties,
    /// Unix seconds at which the event was built, not when the order was placed.
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProperties {
    #[serde(rename = "$email")]
    pub email: String,
    #[serde(rename = "$first_name")]
    pub first_name: Option<String>,
    #[serde(rename = "$last_name")]
    pub last_name: Option<String>,
    #[serde(rename = "$phone_number")]
    pub phone_number: Option<String>,
    #[serde(rename = "$address1")]
    pub address1: Option<String>,
    #[serde(rename = "$address2")]
    pub address2: Option<String>,
    #[serde(rename = "$city")]
    pub city: Option<String>,
    #[serde(rename = "$zip")]
    pub zip: Option<String>,
    #[serde(rename = "$region")]
    pub region: Option<String>,
    #[serde(rename = "$country")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProperties {
    #[serde(rename = "$event_id")]
    pub event_id: u64,
    #[serde(rename = "$value")]
    pub value: Option<BigDecimal>,
    #[serde(rename = "ItemNames")]
    pub item_names: Vec<Option<String>>,
    #[serde(rename = "DiscountCode")]
    pub discount_codes: Vec<DiscountCode>,
    #[serde(rename = "DiscountValue")]
    pub discount_value: Option<BigDecimal>,
    #[serde(rename = "Items")]
    pub items: Vec<OrderItem>,
    #[serde(rename = "BillingAddress")]
    pub billing_address: Option<EventAddress>,
    #[serde(rename = "ShippingAddress")]
    pub shipping_address: Option<EventAddress>,
}

/// Line-item summary embedded in a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "ProductID")]
    pub product_id: u64,
    #[serde(rename = "SKU")]
    pub sku: Option<String>,
    #[serde(rename = "ProductName")]
    pub product_name: Option<String>,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    /// Carries the line item's display name, as historical payloads did.
    #[serde(rename = "ItemPrice")]
    pub item_price: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventAddress {
    #[serde(rename = "FirstName")]
    pub first_name: Option<String>,
    #[serde(rename = "LastName")]
    pub last_name: Option<String>,
    #[serde(rename = "Company")]
    pub company: Option<String>,
    #[serde(rename = "Address1")]
    pub address1: Option<String>,
    #[serde(rename = "Address2")]
    pub address2: Option<String>,
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "Region")]
    pub region: Option<String>,
    #[serde(rename = "RegionCode")]
    pub region_code: Option<String>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "CountryCode")]
    pub country_code: Option<String>,
    #[serde(rename = "Zip")]
    pub zip: Option<String>,
    #[serde(rename = "Phone")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedProductEvent {
    pub token: String,
    pub event: EventKind,
    pub customer_properties: ProductCustomerProperties,
    pub properties: ProductProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCustomerProperties {
    #[serde(rename = "$email")]
    pub email: String,
    #[serde(rename = "$first_name")]
    pub first_name: Option<String>,
    #[serde(rename = "$last_name")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductProperties {
    #[serde(rename = "$event_id")]
    pub event_id: u64,
    #[serde(rename = "$value")]
    pub value: Option<BigDecimal>,
    #[serde(rename = "ProductID")]
    pub product_id: Option<u64>,
    #[serde(rename = "SKU")]
    pub sku: Option<String>,
    #[serde(rename = "ProductName")]
    pub product_name: Option<String>,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
}

/// Product events of one order, tagged with the order they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductEventGroup {
    pub order_id: u64,
    pub events: Vec<OrderedProductEvent>,
}

impl PlacedOrderEvent {
    pub fn order_id(&self) -> u64 {
        self.properties.event_id
    }
}

impl OrderedProductEvent {
    pub fn line_item_id(&self) -> u64 {
        self.properties.event_id
    }
}
