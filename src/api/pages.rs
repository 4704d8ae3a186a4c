use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use serde_json::json;

use crate::{
    api::found,
    error::ApiError,
    management::{DEFAULT_USER, TokenManager},
    server::AppState,
};

/// Status dashboard at `/`. Unconfigured deployments are sent to the
/// credential instructions instead.
pub async fn dashboard(State(state): State<AppState>) -> Result<Response, ApiError> {
    if state.config.credentials().is_none() {
        return Ok(found("/credentials"));
    }

    let tokens = TokenManager::new(state.store.clone());
    let authorized = tokens.is_authorized(DEFAULT_USER).await?;

    let auth_line = if authorized {
        "Authorized. Playback endpoints are live: <a href=\"/now-playing\">/now-playing</a>, <a href=\"/recent\">/recent</a>"
    } else {
        "Not yet authorized. Complete the flow at <a href=\"/setup\">/setup</a>"
    };

    Ok(Html(format!(
        "<h2>Spotify Relay</h2>\
         <p>Environment: {env}</p>\
         <p>{auth_line}</p>",
        env = state.config.environment,
        auth_line = auth_line
    ))
    .into_response())
}

/// Static instructions for configuring client credentials and the API key.
pub async fn credentials_page() -> Html<&'static str> {
    Html(
        "<h2>Credential setup</h2>\
         <p>Create an application in the Spotify developer dashboard, then set\
         <code>SPOTIFY_API_AUTH_CLIENT_ID</code>, <code>SPOTIFY_API_AUTH_CLIENT_SECRET</code>\
         and <code>API_KEY</code> in the server environment and restart.</p>\
         <p>Once configured, continue at <a href=\"/setup\">/setup</a>.</p>",
    )
}

/// OAuth initiation page; the form posts back to `/setup`.
pub async fn setup_page() -> Html<&'static str> {
    Html(
        "<h2>Connect Spotify</h2>\
         <p>You will be redirected to Spotify to grant read-only playback access.</p>\
         <form method=\"post\" action=\"/setup\">\
         <button type=\"submit\">Connect</button>\
         </form>",
    )
}

/// Fallback for unknown paths. Sits behind the gate like every other
/// non-allow-listed route.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}
