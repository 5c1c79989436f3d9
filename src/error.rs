use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Failures that can happen at a gateway boundary.
///
/// Gateways return these instead of panicking; the aggregator and the
/// workflow turn them into renderable results.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// Missing provider credentials or similar deployment problems
    #[error("booking provider not configured: {0}")]
    Config(String),

    /// Malformed or missing request fields, never forwarded upstream
    #[error("{0}")]
    Validation(String),

    /// The provider answered with a non-2xx status
    #[error("Booking provider error: {status}")]
    Provider { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("malformed provider payload: {0}")]
    Malformed(String),

    #[error("Request timed out after {0:?}, please try again")]
    Timeout(Duration),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Provider { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Config(_) | GatewayError::Transport(_) | GatewayError::Malformed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to a visitor. Config details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::Config(_) => "Booking system is not configured".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Malformed(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        if let GatewayError::Config(detail) = &self {
            tracing::error!("Gateway configuration error: {}", detail);
        }
        (self.status_code(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
