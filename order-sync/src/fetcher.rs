//! Order Fetcher: one listing request for the configured created-at window.

use async_trait::async_trait;
use reqwest::Client;
use shared::{OrdersResponse, RawOrder};
use tracing::info;

use crate::config::SourceConfig;
use crate::error::FetchError;

#[async_trait]
pub trait OrderSource {
    async fn fetch_orders(&self) -> Result<Vec<RawOrder>, FetchError>;
}

pub struct ShopifyClient {
    client: Client,
    config: SourceConfig,
}

impl ShopifyClient {
    pub fn new(config: SourceConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::Transport)?;
        Ok(Self { client, config })
    }

    pub fn orders_url(&self) -> String {
        format!("{}/admin/orders.json", self.config.base_url())
    }

    pub fn window_query(&self) -> [(&'static str, String); 2] {
        [
            ("created_at_min", self.config.created_at_min.format("%Y-%m-%d").to_string()),
            ("created_at_max", self.config.created_at_max.format("%Y-%m-%d").to_string()),
        ]
    }
}

#[async_trait]
impl OrderSource for ShopifyClient {
    async fn fetch_orders(&self) -> Result<Vec<RawOrder>, FetchError> {
        let url = self.orders_url();
        info!(
            "Fetching orders from {} created between {} and {}",
            url, self.config.created_at_min, self.config.created_at_max
        );

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.api_key, Some(&self.config.password))
            .query(&self.window_query())
            .send()
            .await
            .map_err(FetchError::Transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = response.text().await.map_err(FetchError::Transport)?;
        let orders = parse_orders(&body)?;
        info!("Fetched {} orders", orders.len());

        Ok(orders)
    }
}

pub fn parse_orders(body: &str) -> Result<Vec<RawOrder>, FetchError> {
    let response: OrdersResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(response.orders)
}
