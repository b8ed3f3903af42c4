//! Error types for the gateway, the envelope decoder and the client fetch path.

use axum::http::StatusCode;
use thiserror::Error;

use crate::config;

/// Failures the gateway manufactures itself. Upstream non-2xx responses are
/// not errors here; they are passed through verbatim.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("ticker_symbol is required")]
    MissingParameter,

    #[error("{name} {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Upstream transport error: {0}")]
    UpstreamTransport(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingParameter | GatewayError::InvalidParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::UpstreamTransport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `{"error": ..}` body. Transport causes stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::UpstreamTransport(_) => config::MSG_UPSTREAM_FAILED.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::UpstreamTransport(err.to_string())
    }
}

/// Failure of either decode pass over the provider envelope.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Envelope is not valid JSON: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),

    #[error("Envelope payload is not valid JSON: {0}")]
    InvalidPayload(#[source] serde_json::Error),

    #[error("Envelope payload has no option_contracts field")]
    MissingContracts,

    #[error("option_contracts is malformed: {0}")]
    InvalidContracts(#[source] serde_json::Error),
}

/// Failure of one client-side fetch through the gateway.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gateway returned {status}: {preview}")]
    Status { status: u16, preview: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
