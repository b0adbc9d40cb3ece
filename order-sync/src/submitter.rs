//! Event Submitter: sends every event on its own request, order event first,
//! then the product events correlated to it by order id.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use shared::{PlacedOrderEvent, ProductEventGroup};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{SubmitOptions, TrackingConfig};
use crate::encoding::encode_event;
use crate::error::{SubmitError, SyncError, SyncResult};
use crate::transformer::TransformOutput;

#[async_trait]
pub trait TrackClient {
    /// Submits one transport-encoded event and returns the parsed response body.
    async fn track(&self, encoded_event: &str) -> Result<serde_json::Value, SubmitError>;
}

pub struct KlaviyoClient {
    client: Client,
    track_url: String,
}

impl KlaviyoClient {
    pub fn new(config: TrackingConfig) -> Result<Self, SubmitError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SubmitError::Transport)?;
        Ok(Self {
            client,
            track_url: config.track_url,
        })
    }
}

#[async_trait]
impl TrackClient for KlaviyoClient {
    async fn track(&self, encoded_event: &str) -> Result<serde_json::Value, SubmitError> {
        let response = self
            .client
            .get(&self.track_url)
            .query(&[("data", encoded_event)])
            .send()
            .await
            .map_err(SubmitError::Transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SubmitError::Status { status, body });
        }

        let body = response.text().await.map_err(SubmitError::Transport)?;
        serde_json::from_str(&body).map_err(|e| SubmitError::Decode(e.to_string()))
    }
}

/// Response to a single submission. `Failed` only appears when the run
/// continues past submission errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SubmissionOutcome {
    Accepted(serde_json::Value),
    Failed { error: String },
}

impl SubmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted(_))
    }

    /// The track endpoint answers `0` with a success status when it drops
    /// the payload.
    pub fn is_rejected(&self) -> bool {
        match self {
            SubmissionOutcome::Accepted(response) => is_rejection(response),
            SubmissionOutcome::Failed { .. } => false,
        }
    }
}

fn is_rejection(response: &serde_json::Value) -> bool {
    match response {
        serde_json::Value::Number(n) => n.as_u64() == Some(0),
        serde_json::Value::String(s) => s.trim() == "0",
        _ => false,
    }
}

/// Counts of a finished run, by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl SubmissionSummary {
    pub fn from_report(report: &[OrderSubmission]) -> Self {
        let mut summary = Self::default();
        let outcomes = report.iter().flat_map(|order| {
            std::iter::once(&order.order_response)
                .chain(order.products.iter().map(|product| &product.response))
        });
        for outcome in outcomes {
            if outcome.is_rejected() {
                summary.rejected += 1;
            } else if outcome.is_accepted() {
                summary.accepted += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSubmission {
    pub id: u64,
    pub response: SubmissionOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSubmission {
    pub order: u64,
    pub order_response: SubmissionOutcome,
    pub products: Vec<ProductSubmission>,
}

pub struct EventSubmitter<C> {
    client: C,
    options: SubmitOptions,
}

impl<C: TrackClient + Sync> EventSubmitter<C> {
    pub fn new(client: C, options: SubmitOptions) -> Self {
        Self { client, options }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Submits events strictly in input order, one request at a time.
    ///
    /// The token is checked before every request. In strict mode the first
    /// failed submission ends the run.
    pub async fn submit_all(
        &self,
        output: &TransformOutput,
        cancel: &CancellationToken,
    ) -> SyncResult<Vec<OrderSubmission>> {
        let groups = index_groups(&output.products);
        let mut submitted = 0;
        let mut report = Vec::with_capacity(output.orders.len());

        for order in &output.orders {
            let order_id = order.order_id();
            let order_response = self
                .submit_one(&format!("order {order_id}"), order, &mut submitted, cancel)
                .await?;

            let mut products = Vec::new();
            for group in groups.get(&order_id).into_iter().flatten() {
                for product in &group.events {
                    let id = product.line_item_id();
                    let response = self
                        .submit_one(
                            &format!("product {id} of order {order_id}"),
                            product,
                            &mut submitted,
                            cancel,
                        )
                        .await?;
                    products.push(ProductSubmission { id, response });
                }
            }

            report.push(OrderSubmission {
                order: order_id,
                order_response,
                products,
            });
        }

        Ok(report)
    }

    async fn submit_one<T: Serialize + Sync>(
        &self,
        label: &str,
        event: &T,
        submitted: &mut usize,
        cancel: &CancellationToken,
    ) -> SyncResult<SubmissionOutcome> {
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled {
                submitted: *submitted,
            });
        }

        let encoded = encode_event(event).map_err(|source| SyncError::Encode {
            event: label.to_string(),
            source,
        })?;

        match self.client.track(&encoded).await {
            Ok(response) if is_rejection(&response) => {
                warn!("Track endpoint rejected {}", label);
                Ok(SubmissionOutcome::Accepted(response))
            }
            Ok(response) => {
                *submitted += 1;
                debug!("Submitted {}", label);
                Ok(SubmissionOutcome::Accepted(response))
            }
            Err(e) if self.options.continue_on_error => {
                warn!("Failed to submit {}: {}", label, e);
                Ok(SubmissionOutcome::Failed {
                    error: e.to_string(),
                })
            }
            Err(source) => Err(SyncError::Submission {
                event: label.to_string(),
                submitted: *submitted,
                source,
            }),
        }
    }
}

/// Product groups keyed by parent order id, keeping their input order.
fn index_groups(groups: &[ProductEventGroup]) -> HashMap<u64, Vec<&ProductEventGroup>> {
    let mut index: HashMap<u64, Vec<&ProductEventGroup>> = HashMap::new();
    for group in groups {
        index.entry(group.order_id).or_default().push(group);
    }
    index
}

/// Total number of requests a full run will issue.
pub fn planned_submissions(orders: &[PlacedOrderEvent], groups: &[ProductEventGroup]) -> usize {
    let index = index_groups(groups);
    orders
        .iter()
        .map(|order| {
            1 + index
                .get(&order.order_id())
                .map(|groups| groups.iter().map(|g| g.events.len()).sum::<usize>())
                .unwrap_or(0)
        })
        .sum()
}
