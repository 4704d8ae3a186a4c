//! # API Module
//!
//! HTTP surface of the relay. Handlers are thin: they validate input, talk
//! to the key-value store through the managers in [`crate::management`],
//! forward at most one upstream call through [`crate::spotify`], and relay
//! the JSON outcome.
//!
//! ## Endpoints
//!
//! ### Public (reachable without an API key)
//!
//! - [`health`] - configuration/OAuth completeness flags
//! - [`credentials_page`] - credential-configuration instructions
//! - [`setup_page`] / [`setup`] - OAuth initiation page and the redirect
//!   into the authorization server
//! - [`callback`] - completes the authorization-code exchange
//!
//! The OAuth redirect cannot carry a bearer header and first-time setup
//! happens before any key exists, so these stay outside the gate.
//!
//! ### Protected (behind [`guard`])
//!
//! - [`dashboard`] - status overview
//! - [`now_playing`] - current playback
//! - [`recent`] - listening history
//! - [`not_found`] - fallback for unknown paths

mod callback;
mod guard;
mod health;
mod pages;
mod player;
mod setup;

pub use callback::callback;
pub use guard::guard;
pub use health::health;
pub use pages::credentials_page;
pub use pages::dashboard;
pub use pages::not_found;
pub use pages::setup_page;
pub use player::now_playing;
pub use player::recent;
pub use setup::setup;

use axum::{
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{config::CALLBACK_PATH, error::ApiError, utils};

/// Plain 302 redirect. Axum's `Redirect` helpers emit 303/307/308; the OAuth
/// initiation contract is a 302.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Redirect URI for this deployment, derived from the inbound request's own
/// origin. Initiation and the later token exchange must send the identical
/// value; both call through here.
pub(crate) fn callback_redirect_uri(headers: &HeaderMap) -> Result<String, ApiError> {
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok());

    let origin = utils::request_origin(host, proto)
        .ok_or_else(|| ApiError::BadRequest("Missing Host header".to_string()))?;
    Ok(format!("{}{}", origin, CALLBACK_PATH))
}
