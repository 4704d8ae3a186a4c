use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::{error::ApiError, server::AppState};

/// Authentication gate in front of every protected handler.
///
/// Compares the bearer credential byte-for-byte against the configured
/// static API key. Produces a terminal response itself only on failure;
/// on a match the request proceeds untouched.
pub async fn guard(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // A missing key is a server-side misconfiguration, not a client fault.
    let Some(expected) = state.config.api_key.as_deref() else {
        return Err(ApiError::NotConfigured(
            "API key is not configured on the server".to_string(),
        ));
    };

    let Some(header) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        return Err(ApiError::Unauthorized(
            "Missing Authorization header. Send: Authorization: Bearer <api-key>".to_string(),
        ));
    };

    let Some(candidate) = header.strip_prefix("Bearer ") else {
        return Err(ApiError::Unauthorized(
            "Malformed Authorization header: expected the Bearer scheme".to_string(),
        ));
    };

    if candidate != expected {
        return Err(ApiError::Unauthorized("Invalid API key".to_string()));
    }

    Ok(next.run(req).await)
}
