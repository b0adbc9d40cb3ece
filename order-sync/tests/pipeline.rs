use std::sync::Mutex;

use async_trait::async_trait;
use order_sync::config::{SubmitOptions, TransformConfig};
use order_sync::encoding::decode_event;
use order_sync::error::{FetchError, SubmitError};
use order_sync::fetcher::{parse_orders, OrderSource};
use order_sync::submitter::{EventSubmitter, SubmissionOutcome, TrackClient};
use order_sync::transformer::EventTransformer;
use order_sync::{SyncError, SyncPipeline};
use shared::{OrderedProductEvent, PlacedOrderEvent, RawOrder};
use tokio_util::sync::CancellationToken;

/// Serves a canned `admin/orders.json` body, or a canned failure.
struct StaticOrders {
    body: Option<&'static str>,
}

#[async_trait]
impl OrderSource for StaticOrders {
    async fn fetch_orders(&self) -> Result<Vec<RawOrder>, FetchError> {
        match self.body {
            Some(body) => parse_orders(body),
            None => Err(FetchError::Status {
                status: 401,
                body: "[API] Invalid API key or access token".to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct FakeTracker {
    payloads: Mutex<Vec<String>>,
}

#[async_trait]
impl TrackClient for FakeTracker {
    async fn track(&self, encoded_event: &str) -> Result<serde_json::Value, SubmitError> {
        self.payloads.lock().unwrap().push(encoded_event.to_string());
        Ok(serde_json::json!(1))
    }
}

const PAID_ORDER: &str = r#"{
    "orders": [
        {
            "id": 1001,
            "financial_status": "paid",
            "total_price": "409.94",
            "total_discounts": "0.00",
            "discount_codes": [],
            "customer": {
                "email": "jane@example.com",
                "first_name": "Jane",
                "last_name": "Doe",
                "phone": null
            },
            "shipping_address": {
                "first_name": "Jane",
                "last_name": "Doe",
                "address1": "123 Amoebobacterieae St",
                "city": "Ottawa",
                "province": "Ontario",
                "province_code": "ON",
                "country": "Canada",
                "country_code": "CA",
                "zip": "K2P0V6"
            },
            "line_items": [
                {"id": 1, "sku": "SKU-1", "title": "Shirt", "quantity": 1, "price": "199.00", "product_id": 10, "name": "Shirt - M"},
                {"id": 2, "sku": null, "title": "Socks", "quantity": 3, "price": "70.31", "product_id": 20, "name": "Socks"}
            ]
        }
    ]
}"#;

const CANCELLED_ORDER: &str = r#"{
    "orders": [
        {
            "id": 2002,
            "financial_status": "cancelled",
            "customer": {"email": "sam@example.com"},
            "line_items": [
                {"id": 3, "title": "Hat", "quantity": 1, "price": "25.00", "product_id": 30, "name": "Hat"}
            ]
        }
    ]
}"#;

fn pipeline(body: Option<&'static str>) -> SyncPipeline<StaticOrders, FakeTracker> {
    SyncPipeline::new(
        StaticOrders { body },
        EventTransformer::new(TransformConfig::new("pk_test", ["paid"])),
        EventSubmitter::new(FakeTracker::default(), SubmitOptions::default()),
    )
}

fn payloads(pipeline: &SyncPipeline<StaticOrders, FakeTracker>) -> Vec<String> {
    pipeline.submitter().client().payloads.lock().unwrap().clone()
}

#[tokio::test]
async fn test_paid_order_without_default_address_end_to_end() {
    let pipeline = pipeline(Some(PAID_ORDER));

    let report = pipeline.run(&CancellationToken::new()).await.unwrap();

    let payloads = payloads(&pipeline);
    assert_eq!(payloads.len(), 3);

    let order: PlacedOrderEvent = decode_event(&payloads[0]).unwrap();
    assert_eq!(order.order_id(), 1001);
    assert_eq!(order.properties.items.len(), 2);
    assert_eq!(order.customer_properties.address1, None);
    assert_eq!(order.customer_properties.city, None);
    assert_eq!(order.customer_properties.country, None);
    assert!(order.properties.billing_address.is_none());
    let shipping = order.properties.shipping_address.unwrap();
    assert_eq!(shipping.region_code.as_deref(), Some("ON"));

    let first: OrderedProductEvent = decode_event(&payloads[1]).unwrap();
    let second: OrderedProductEvent = decode_event(&payloads[2]).unwrap();
    assert_eq!(first.line_item_id(), 1);
    assert_eq!(second.line_item_id(), 2);
    assert_eq!(second.properties.quantity, 3);

    assert_eq!(report.len(), 1);
    assert_eq!(report[0].order, 1001);
    assert_eq!(report[0].order_response, SubmissionOutcome::Accepted(serde_json::json!(1)));
    assert_eq!(report[0].products.len(), 2);
    assert!(report[0].products.iter().all(|p| p.response.is_accepted()));
}

#[tokio::test]
async fn test_order_outside_complete_statuses_sends_nothing() {
    let pipeline = pipeline(Some(CANCELLED_ORDER));

    let report = pipeline.run(&CancellationToken::new()).await.unwrap();

    assert!(report.is_empty());
    assert!(payloads(&pipeline).is_empty());
}

#[tokio::test]
async fn test_empty_listing_yields_empty_report() {
    let pipeline = pipeline(Some(r#"{"orders": []}"#));

    let report = pipeline.run(&CancellationToken::new()).await.unwrap();

    assert!(report.is_empty());
    assert!(payloads(&pipeline).is_empty());
    assert_eq!(serde_json::to_string(&report).unwrap(), "[]");
}

#[tokio::test]
async fn test_fetch_failure_ends_run_before_any_submission() {
    let pipeline = pipeline(None);

    let err = pipeline.run(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, SyncError::Fetch(FetchError::Status { status: 401, .. })));
    assert!(payloads(&pipeline).is_empty());
}

#[tokio::test]
async fn test_qualifying_order_without_email_is_malformed() {
    let pipeline = pipeline(Some(
        r#"{"orders": [{"id": 3003, "financial_status": "paid", "customer": {"first_name": "Ann"}, "line_items": []}]}"#,
    ));

    let err = pipeline.run(&CancellationToken::new()).await.unwrap_err();

    assert_eq!(err.to_string(), "order 3003 is missing required field `customer.email`");
    assert!(payloads(&pipeline).is_empty());
}
