use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;

use crate::error::{SyncError, SyncResult};

pub const DEFAULT_TRACK_URL: &str = "https://a.klaviyo.com/api/track";

#[derive(Debug, Clone, Parser)]
#[command(name = "order-sync", about = "Replay historical storefront orders as tracked events")]
pub struct Args {
    #[arg(long, env = "SHOPIFY_API_KEY", hide_env_values = true)]
    pub shopify_api_key: String,

    #[arg(long, env = "SHOPIFY_PASSWORD", hide_env_values = true)]
    pub shopify_password: String,

    #[arg(long, env = "SHOPIFY_SHOP_NAME")]
    pub shop_name: String,

    /// Overrides https://{shop_name}.myshopify.com
    #[arg(long, env = "SHOPIFY_BASE_URL")]
    pub shopify_base_url: Option<String>,

    #[arg(long, env = "KLAVIYO_PUBLIC_KEY", hide_env_values = true)]
    pub klaviyo_public_key: String,

    #[arg(long, env = "KLAVIYO_TRACK_URL", default_value = DEFAULT_TRACK_URL)]
    pub klaviyo_track_url: String,

    #[arg(
        long,
        env = "COMPLETE_ORDER_STATUSES",
        value_delimiter = ',',
        default_value = "paid,partially_refunded"
    )]
    pub complete_statuses: Vec<String>,

    #[arg(long, env = "CREATED_AT_MIN", default_value = "2016-01-01")]
    pub created_at_min: NaiveDate,

    #[arg(long, env = "CREATED_AT_MAX", default_value = "2016-12-31")]
    pub created_at_max: NaiveDate,

    /// Record failed submissions in the report instead of aborting the run
    #[arg(long, env = "CONTINUE_ON_ERROR", default_value_t = false)]
    pub continue_on_error: bool,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub api_key: String,
    pub password: String,
    pub shop_name: String,
    pub base_url: Option<String>,
    pub created_at_min: NaiveDate,
    pub created_at_max: NaiveDate,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TrackingConfig {
    pub track_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TransformConfig {
    pub public_key: String,
    pub complete_statuses: HashSet<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitOptions {
    pub continue_on_error: bool,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub source: SourceConfig,
    pub tracking: TrackingConfig,
    pub transform: TransformConfig,
    pub submit: SubmitOptions,
}

impl SourceConfig {
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.myshopify.com", self.shop_name),
        }
    }
}

impl TransformConfig {
    pub fn new<I, S>(public_key: impl Into<String>, complete_statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            public_key: public_key.into(),
            complete_statuses: complete_statuses.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Args> for SyncConfig {
    fn from(args: Args) -> Self {
        let timeout = Duration::from_secs(args.request_timeout_secs);
        let complete_statuses = args
            .complete_statuses
            .iter()
            .map(|status| status.trim())
            .filter(|status| !status.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            source: SourceConfig {
                api_key: args.shopify_api_key,
                password: args.shopify_password,
                shop_name: args.shop_name,
                base_url: args.shopify_base_url,
                created_at_min: args.created_at_min,
                created_at_max: args.created_at_max,
                timeout,
            },
            tracking: TrackingConfig {
                track_url: args.klaviyo_track_url,
                timeout,
            },
            transform: TransformConfig {
                public_key: args.klaviyo_public_key,
                complete_statuses,
            },
            submit: SubmitOptions {
                continue_on_error: args.continue_on_error,
            },
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> SyncResult<()> {
        let required = [
            ("shopify api key", &self.source.api_key),
            ("shopify password", &self.source.password),
            ("shop name", &self.source.shop_name),
            ("klaviyo public key", &self.transform.public_key),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SyncError::Config(format!("{name} must not be empty")));
            }
        }

        if self.source.created_at_min > self.source.created_at_max {
            return Err(SyncError::Config(format!(
                "created_at_min {} is after created_at_max {}",
                self.source.created_at_min, self.source.created_at_max
            )));
        }

        if self.transform.complete_statuses.is_empty() {
            return Err(SyncError::Config(
                "at least one complete order status is required".to_string(),
            ));
        }

        Ok(())
    }
}
