//! Order records as returned by the storefront's `admin/orders.json` listing.
//!
//! Every nested structure the storefront may leave out is an `Option`: a key
//! that is missing and a key that is present but `null` both deserialize to
//! `None`.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrdersResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub orders: Vec<RawOrder>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOrder {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub financial_status: Option<String>,
    #[serde(default)]
    pub customer: Option<RawCustomer>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub line_items: Vec<RawLineItem>,
    #[serde(default, deserialize_with = "decimal")]
    pub total_price: Option<BigDecimal>,
    #[serde(default, deserialize_with = "decimal")]
    pub total_discounts: Option<BigDecimal>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub discount_codes: Vec<DiscountCode>,
    #[serde(default)]
    pub billing_address: Option<RawAddress>,
    #[serde(default)]
    pub shipping_address: Option<RawAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCustomer {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub default_address: Option<RawAddress>,
}

/// Shared shape of a customer's default address and an order's
/// billing/shipping address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAddress {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub province_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLineItem {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "decimal")]
    pub price: Option<BigDecimal>,
    #[serde(default)]
    pub product_id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscountCode {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "decimal")]
    pub amount: Option<BigDecimal>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// `null` deserializes to the field's default, like a missing key does.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Money arrives as a decimal string. Numbers are parsed from their shortest
/// text form so `598.94` keeps scale 2 instead of the f64 expansion.
fn decimal<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(DecimalVisitor)
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = Option<BigDecimal>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal string, a number or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        BigDecimal::from_str(value).map(Some).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(BigDecimal::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(BigDecimal::from(value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if !value.is_finite() {
            return Err(E::custom(format!("non-finite amount {value}")));
        }
        BigDecimal::from_str(&value.to_string()).map(Some).map_err(E::custom)
    }
}

impl RawOrder {
    pub fn is_complete(&self, complete_statuses: &std::collections::HashSet<String>) -> bool {
        self.financial_status
            .as_deref()
            .is_some_and(|status| complete_statuses.contains(status))
    }

    pub fn item_names(&self) -> Vec<Option<String>> {
        self.line_items.iter().map(|item| item.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::str::FromStr;

    const ORDER_JSON: &str = r#"{
        "orders": [
            {
                "id": 450789469,
                "financial_status": "paid",
                "total_price": "598.94",
                "total_discounts": "10.00",
                "discount_codes": [{"code": "TENOFF", "amount": "10.00", "type": "fixed_amount"}],
                "customer": {
                    "email": "bob.norman@example.com",
                    "first_name": "Bob",
                    "last_name": "Norman",
                    "phone": null
                },
                "billing_address": null,
                "line_items": [
                    {
                        "id": 466157049,
                        "sku": "IPOD2008GREEN",
                        "title": "IPod Nano - 8gb",
                        "quantity": 1,
                        "price": "199.00",
                        "product_id": 632910392,
                        "name": "IPod Nano - 8gb - green"
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_missing_and_null_structures_both_deserialize_to_none() {
        let response: OrdersResponse = serde_json::from_str(ORDER_JSON).unwrap();
        let order = &response.orders[0];

        assert_eq!(order.id, Some(450789469));
        let customer = order.customer.as_ref().unwrap();
        assert!(customer.default_address.is_none());
        assert!(customer.phone.is_none());
        assert!(order.billing_address.is_none());
        assert!(order.shipping_address.is_none());
    }

    #[test]
    fn test_money_fields_parse_from_decimal_strings() {
        let response: OrdersResponse = serde_json::from_str(ORDER_JSON).unwrap();
        let order = &response.orders[0];

        assert_eq!(order.total_price, Some(BigDecimal::from_str("598.94").unwrap()));
        assert_eq!(order.line_items[0].price, Some(BigDecimal::from_str("199").unwrap()));
        assert_eq!(order.discount_codes[0].kind.as_deref(), Some("fixed_amount"));
    }

    #[test]
    fn test_is_complete_checks_financial_status() {
        let statuses: HashSet<String> = ["paid".to_string()].into_iter().collect();
        let mut order = RawOrder {
            financial_status: Some("paid".to_string()),
            ..Default::default()
        };
        assert!(order.is_complete(&statuses));

        order.financial_status = Some("cancelled".to_string());
        assert!(!order.is_complete(&statuses));

        order.financial_status = None;
        assert!(!order.is_complete(&statuses));
    }

    #[test]
    fn test_null_collections_and_quantity_use_defaults() {
        let body = r#"{
            "orders": [
                {
                    "id": 1,
                    "financial_status": "refunded",
                    "line_items": null,
                    "discount_codes": null
                },
                {
                    "id": 2,
                    "financial_status": "paid",
                    "line_items": [{"id": 21, "quantity": null, "price": null}]
                }
            ]
        }"#;

        let response: OrdersResponse = serde_json::from_str(body).unwrap();

        assert!(response.orders[0].line_items.is_empty());
        assert!(response.orders[0].discount_codes.is_empty());
        let item = &response.orders[1].line_items[0];
        assert_eq!(item.quantity, 0);
        assert_eq!(item.price, None);

        let response: OrdersResponse = serde_json::from_str(r#"{"orders": null}"#).unwrap();
        assert!(response.orders.is_empty());
    }

    #[test]
    fn test_numeric_money_keeps_its_text_scale() {
        let body = r#"{"orders": [{"id": 1, "total_price": 598.94, "total_discounts": 10}]}"#;

        let response: OrdersResponse = serde_json::from_str(body).unwrap();
        let order = &response.orders[0];

        let total = order.total_price.clone().unwrap();
        assert_eq!(total.to_string(), "598.94");
        assert_eq!(order.total_discounts, Some(BigDecimal::from(10)));
        assert_eq!(serde_json::to_value(order).unwrap()["total_price"], "598.94");
    }

    #[test]
    fn test_empty_listing() {
        let response: OrdersResponse = serde_json::from_str(r#"{"orders": []}"#).unwrap();
        assert!(response.orders.is_empty());
    }
}
