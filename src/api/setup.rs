use axum::{extract::State, http::HeaderMap, response::Response};

use crate::{
    api::{callback_redirect_uri, found},
    error::ApiError,
    info,
    management::StateManager,
    server::AppState,
    spotify,
};

/// Initiates the authorization flow (POST `/setup`).
///
/// Issues a fresh CSRF state token, persists it with a short expiry, and
/// answers with a 302 into the authorization server. The redirect is the
/// sole network-visible side effect; nothing else is written.
///
/// Concurrent initiations are fine: each attempt gets its own state key and
/// every one of them stays independently redeemable until it expires.
pub async fn setup(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    // Without client credentials the flow cannot start; send the user to the
    // configuration instructions instead of failing.
    let Some((client_id, _)) = state.config.credentials() else {
        return Ok(found("/credentials"));
    };

    let states = StateManager::new(state.store.clone());
    let csrf_state = states.issue().await?;

    let redirect_uri = callback_redirect_uri(&headers)?;
    let url = spotify::auth::authorize_url(&state.config, client_id, &redirect_uri, &csrf_state)?;

    info!("Authorization initiated, redirecting to {}", state.config.auth_url);
    Ok(found(&url))
}
