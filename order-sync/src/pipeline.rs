use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::fetcher::{OrderSource, ShopifyClient};
use crate::submitter::{
    planned_submissions, EventSubmitter, KlaviyoClient, OrderSubmission, SubmissionSummary,
    TrackClient,
};
use crate::transformer::EventTransformer;

/// Fetch, transform and submit, each stage running to completion before the
/// next one starts.
pub struct SyncPipeline<S, C> {
    source: S,
    transformer: EventTransformer,
    submitter: EventSubmitter<C>,
}

impl SyncPipeline<ShopifyClient, KlaviyoClient> {
    pub fn from_config(config: SyncConfig) -> SyncResult<Self> {
        config.validate()?;

        let source = ShopifyClient::new(config.source)?;
        let client = KlaviyoClient::new(config.tracking)
            .map_err(|e| SyncError::Config(e.to_string()))?;

        Ok(Self::new(
            source,
            EventTransformer::new(config.transform),
            EventSubmitter::new(client, config.submit),
        ))
    }
}

impl<S, C> SyncPipeline<S, C>
where
    S: OrderSource + Sync,
    C: TrackClient + Sync,
{
    pub fn new(source: S, transformer: EventTransformer, submitter: EventSubmitter<C>) -> Self {
        Self {
            source,
            transformer,
            submitter,
        }
    }

    pub fn submitter(&self) -> &EventSubmitter<C> {
        &self.submitter
    }

    pub async fn run(&self, cancel: &CancellationToken) -> SyncResult<Vec<OrderSubmission>> {
        let orders = self.source.fetch_orders().await?;

        let events = self.transformer.transform(&orders, Utc::now())?;
        info!(
            "Built {} placed order events and {} ordered product events from {} orders",
            events.orders.len(),
            events.product_event_count(),
            orders.len()
        );
        info!(
            "Submitting {} events",
            planned_submissions(&events.orders, &events.products)
        );

        let report = self.submitter.submit_all(&events, cancel).await?;

        let summary = SubmissionSummary::from_report(&report);
        info!(
            "Sync finished for {} orders: {} accepted, {} rejected, {} failed submissions",
            report.len(),
            summary.accepted,
            summary.rejected,
            summary.failed
        );

        Ok(report)
    }
}
