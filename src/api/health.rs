use axum::{extract::State, response::Json};

use crate::{
    error::ApiError,
    management::{DEFAULT_USER, TokenManager},
    server::AppState,
    types::HealthStatus,
};

/// Reports configuration and OAuth completeness as boolean flags.
/// Secret values never appear in the payload.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    let tokens = TokenManager::new(state.store.clone());
    let oauth_complete = tokens.is_authorized(DEFAULT_USER).await?;

    Ok(Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        api_key_configured: state.config.api_key.is_some(),
        credentials_configured: state.config.credentials().is_some(),
        oauth_complete,
    }))
}
