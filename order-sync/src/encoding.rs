//! Transport encoding for track payloads: JSON, then standard base64.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid event json: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn encode_event<T: Serialize>(event: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(event)?;
    Ok(STANDARD.encode(json))
}

pub fn decode_event<T: DeserializeOwned>(encoded: &str) -> Result<T, DecodeError> {
    let json = STANDARD.decode(encoded)?;
    Ok(serde_json::from_slice(&json)?)
}
