//! Reshapes storefront orders into track events.
//!
//! The transformer is pure: it does no I/O and takes the event timestamp as an
//! argument, so the same orders and the same `now` always yield the same
//! output.

use chrono::{DateTime, Utc};
use shared::*;
use tracing::debug;

use crate::config::TransformConfig;
use crate::error::{SyncError, SyncResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOutput {
    pub orders: Vec<PlacedOrderEvent>,
    pub products: Vec<ProductEventGroup>,
}

impl TransformOutput {
    pub fn product_event_count(&self) -> usize {
        self.products.iter().map(|group| group.events.len()).sum()
    }
}

pub struct EventTransformer {
    config: TransformConfig,
}

impl EventTransformer {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    /// Builds one placed-order event and one product group per qualifying
    /// order. Orders whose financial status is not complete yield nothing.
    pub fn transform(
        &self,
        orders: &[RawOrder],
        now: DateTime<Utc>,
    ) -> SyncResult<TransformOutput> {
        let mut output = TransformOutput::default();

        for (position, order) in orders.iter().enumerate() {
            if !order.is_complete(&self.config.complete_statuses) {
                debug!(
                    "Skipping order {:?} with financial status {:?}",
                    order.id, order.financial_status
                );
                continue;
            }

            let order_id = order.id.ok_or_else(|| SyncError::MalformedRecord {
                order: format!("at position {position}"),
                field: "id",
            })?;
            let customer = order.customer.as_ref().ok_or_else(|| malformed(order_id, "customer"))?;
            let email = customer
                .email
                .clone()
                .filter(|email| !email.is_empty())
                .ok_or_else(|| malformed(order_id, "customer.email"))?;

            let mut items = Vec::with_capacity(order.line_items.len());
            let mut events = Vec::with_capacity(order.line_items.len());
            for item in &order.line_items {
                let line_item_id = item.id.ok_or_else(|| malformed(order_id, "line_items.id"))?;
                items.push(order_item(line_item_id, item));
                events.push(self.product_event(line_item_id, item, customer, &email));
            }

            output.products.push(ProductEventGroup { order_id, events });
            output
                .orders
                .push(self.placed_order_event(order_id, order, customer, email, items, now));
        }

        Ok(output)
    }

    fn placed_order_event(
        &self,
        order_id: u64,
        order: &RawOrder,
        customer: &RawCustomer,
        email: String,
        items: Vec<OrderItem>,
        now: DateTime<Utc>,
    ) -> PlacedOrderEvent {
        let address = flatten_address(customer.default_address.as_ref());

        PlacedOrderEvent {
            token: self.config.public_key.clone(),
            event: EventKind::PlacedOrder,
            customer_properties: CustomerProperties {
                email,
                first_name: customer.first_name.clone(),
                last_name: customer.last_name.clone(),
                phone_number: customer.phone.clone(),
                address1: address.address1,
                address2: address.address2,
                city: address.city,
                zip: address.zip,
                region: address.region_code,
                country: address.country,
            },
            properties: OrderProperties {
                event_id: order_id,
                value: order.total_price.clone(),
                item_names: order.item_names(),
                discount_codes: order.discount_codes.clone(),
                discount_value: order.total_discounts.clone(),
                items,
                billing_address: order.billing_address.as_ref().map(event_address),
                shipping_address: order.shipping_address.as_ref().map(event_address),
            },
            time: now.timestamp(),
        }
    }

    fn product_event(
        &self,
        line_item_id: u64,
        item: &RawLineItem,
        customer: &RawCustomer,
        email: &str,
    ) -> OrderedProductEvent {
        OrderedProductEvent {
            token: self.config.public_key.clone(),
            event: EventKind::OrderedProduct,
            customer_properties: ProductCustomerProperties {
                email: email.to_string(),
                first_name: customer.first_name.clone(),
                last_name: customer.last_name.clone(),
            },
            properties: ProductProperties {
                event_id: line_item_id,
                value: item.price.clone(),
                product_id: item.product_id,
                sku: item.sku.clone(),
                product_name: item.title.clone(),
                quantity: item.quantity,
            },
        }
    }
}

fn malformed(order_id: u64, field: &'static str) -> SyncError {
    SyncError::MalformedRecord {
        order: order_id.to_string(),
        field,
    }
}

fn order_item(line_item_id: u64, item: &RawLineItem) -> OrderItem {
    OrderItem {
        product_id: line_item_id,
        sku: item.sku.clone(),
        product_name: item.title.clone(),
        quantity: item.quantity,
        item_price: item.name.clone(),
    }
}

/// Customer-level view of a default address.
#[derive(Default)]
struct FlatAddress {
    address1: Option<String>,
    address2: Option<String>,
    city: Option<String>,
    zip: Option<String>,
    region_code: Option<String>,
    country: Option<String>,
}

/// A missing address and a missing sub-field both map to `None`.
fn flatten_address(address: Option<&RawAddress>) -> FlatAddress {
    let Some(address) = address else {
        return FlatAddress::default();
    };

    FlatAddress {
        address1: address.address1.clone(),
        address2: address.address2.clone(),
        city: address.city.clone(),
        zip: address.zip.clone(),
        region_code: address.province_code.clone(),
        country: address.country_name.clone(),
    }
}

fn event_address(address: &RawAddress) -> EventAddress {
    EventAddress {
        first_name: address.first_name.clone(),
        last_name: address.last_name.clone(),
        company: address.company.clone(),
        address1: address.address1.clone(),
        address2: address.address2.clone(),
        city: address.city.clone(),
        region: address.province.clone(),
        region_code: address.province_code.clone(),
        country: address.country.clone(),
        country_code: address.country_code.clone(),
        zip: address.zip.clone(),
        phone: address.phone.clone(),
    }
}
