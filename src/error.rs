//! Response-level error taxonomy for the relay's HTTP surface.
//!
//! A single `ApiError` enum consolidates every failure a handler can produce.
//! By implementing `axum::response::IntoResponse` it can be returned directly
//! from any handler with `?`. Internal failure details are logged and
//! collapsed to a generic 500 body so they never leak to the caller.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{management::StoreError, warning};

#[derive(Error, Debug)]
pub enum ApiError {
    /// Server-side misconfiguration (missing API key or client credentials).
    /// Operator action required; never the caller's fault.
    #[error("{0}")]
    NotConfigured(String),

    /// The caller failed the authentication gate or setup is incomplete.
    #[error("{0}")]
    Unauthorized(String),

    /// Malformed callback input: missing parameters, unknown or expired
    /// CSRF state, or an explicit error relayed by the authorization server.
    #[error("{0}")]
    BadRequest(String),

    /// The upstream API answered a data call with a non-success status.
    /// Relayed with the upstream's own status code.
    #[error("Upstream error: {1}")]
    Upstream(StatusCode, String),

    /// Key-value store failure.
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    /// The upstream answered 2xx with a payload that does not match the
    /// documented shape.
    #[error("Malformed upstream payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level failure talking to the upstream service.
    #[error("Upstream request failed")]
    Http(#[from] reqwest::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotConfigured(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),

            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),

            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),

            ApiError::Upstream(status, msg) => (status, msg),

            ApiError::Store(err) => {
                warning!("Store error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }

            ApiError::Json(err) => {
                warning!("Malformed upstream payload: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }

            ApiError::Http(err) => {
                warning!("Upstream request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
