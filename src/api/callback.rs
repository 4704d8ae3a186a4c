use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Html,
};

use crate::{
    api::callback_redirect_uri,
    error::ApiError,
    management::{DEFAULT_USER, StateManager, TokenManager},
    server::AppState,
    spotify, success,
};

/// Completes the authorization flow (GET `/callback`).
///
/// Validates the CSRF state against its pending store entry before anything
/// else; a state that was never issued, already redeemed, or expired stops
/// the request ahead of the token exchange. On a successful exchange the
/// token record is persisted and the state entry deleted, in that order, so
/// a failed exchange consumes nothing.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<&'static str>, ApiError> {
    // The authorization server explicitly denied or failed the request.
    if let Some(err) = params.get("error") {
        return Err(ApiError::BadRequest(format!(
            "Authorization failed: {}",
            err
        )));
    }

    let (Some(code), Some(csrf_state)) = (params.get("code"), params.get("state")) else {
        return Err(ApiError::BadRequest(
            "Missing authorization code or state".to_string(),
        ));
    };

    let Some((client_id, client_secret)) = state.config.credentials() else {
        return Err(ApiError::NotConfigured(
            "Spotify client credentials are not configured".to_string(),
        ));
    };

    let states = StateManager::new(state.store.clone());
    if !states.is_pending(csrf_state).await? {
        return Err(ApiError::BadRequest(
            "Invalid or expired state parameter".to_string(),
        ));
    }

    // Must match the redirect URI sent during initiation exactly.
    let redirect_uri = callback_redirect_uri(&headers)?;

    let token = spotify::auth::exchange_code(
        &state.config,
        client_id,
        client_secret,
        code,
        &redirect_uri,
    )
    .await?;

    let tokens = TokenManager::new(state.store.clone());
    tokens.save(DEFAULT_USER, &token).await?;
    states.consume(csrf_state).await?;

    success!("Authorization completed, token record stored");

    Ok(Html(
        "<h2>Setup complete.</h2>\
         <p>The relay is authorized. Try <a href=\"/now-playing\">/now-playing</a>\
         or <a href=\"/recent\">/recent</a> with your API key.</p>",
    ))
}
