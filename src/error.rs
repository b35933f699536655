use std::time::Duration;

use thiserror::Error;

/// Unified error type for melon
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status} for {endpoint}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Timed out after {after:?} waiting for {endpoint}")]
    Timeout { endpoint: String, after: Duration },

    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl GatewayError {
    /// Transport-level failures are the ones the gateway may paper over
    /// with simulated data.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Status { .. }
                | Self::WebSocket(_)
                | Self::Timeout { .. }
                | Self::Json(_)
        )
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
