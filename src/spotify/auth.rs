use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::{Client, Url, header::AUTHORIZATION};
use serde_json::Value;

use crate::{config::Config, error::ApiError, types::Token};

/// Builds the authorization URL users are redirected to during `Initiate`.
///
/// Carries `response_type=code`, the client identifier, the configured
/// read-only scope set, the exact redirect URI the callback will later echo,
/// and the freshly issued CSRF state. All parameters are query-encoded.
///
/// # Example
///
/// ```
/// let url = authorize_url(&cfg, id, "https://relay.example/callback", &state)?;
/// // => https://accounts.spotify.com/authorize?response_type=code&client_id=...&state=...
/// ```
pub fn authorize_url(
    config: &Config,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> Result<String, ApiError> {
    let url = Url::parse_with_params(
        &config.auth_url,
        &[
            ("response_type", "code"),
            ("client_id", client_id),
            ("scope", &config.scope),
            ("redirect_uri", redirect_uri),
            ("state", state),
        ],
    )
    .map_err(|e| ApiError::NotConfigured(format!("Invalid authorization endpoint URL: {}", e)))?;

    Ok(url.to_string())
}

/// Exchanges an authorization code for an access token.
///
/// Completes the authorization-code flow: POSTs to the token endpoint with
/// HTTP Basic authentication built from the client identifier and secret,
/// the single-use code, and the same redirect URI sent during `Initiate`
/// (the upstream validates this for an exact match).
///
/// A rejected exchange surfaces as a 400 carrying the upstream's status
/// text. It is never retried: the code cannot be redeemed twice, so a second
/// attempt with the same code cannot help.
pub async fn exchange_code(
    config: &Config,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<Token, ApiError> {
    let basic = STANDARD.encode(format!("{}:{}", client_id, client_secret));

    let client = Client::new();
    let res = client
        .post(&config.token_url)
        .header(AUTHORIZATION, format!("Basic {}", basic))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        return Err(ApiError::BadRequest(format!(
            "Token exchange failed: {}",
            status.canonical_reason().unwrap_or(status.as_str())
        )));
    }

    let json: Value = res.json().await?;

    Ok(Token {
        access_token: json["access_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        refresh_token: json["refresh_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        scope: json["scope"].as_str().unwrap_or_default().to_string(),
        expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
        obtained_at: Utc::now().timestamp() as u64,
    })
}
