//! Error taxonomy for a sync run

use thiserror::Error;

/// Failure talking to the storefront's order listing
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("order listing request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("order listing returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("order listing body could not be decoded: {0}")]
    Decode(String),
}

/// Failure submitting a single event to the track endpoint
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("track request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("track endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("track response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to fetch orders: {0}")]
    Fetch(#[from] FetchError),

    /// A qualifying order is missing a field every event needs
    #[error("order {order} is missing required field `{field}`")]
    MalformedRecord { order: String, field: &'static str },

    #[error("failed to encode event {event}: {source}")]
    Encode {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    /// `submitted` counts events the track endpoint had already accepted
    #[error("failed to submit {event} after {submitted} accepted events: {source}")]
    Submission {
        event: String,
        submitted: usize,
        #[source]
        source: SubmitError,
    },

    #[error("sync cancelled after {submitted} accepted events")]
    Cancelled { submitted: usize },
}

pub type SyncResult<T> = Result<T, SyncError>;
