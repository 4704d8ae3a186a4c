use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::config::Config;

/// Outcome of a read-only Web API call.
///
/// `NoContent` is the upstream's "nothing to report" signal (no track
/// currently playing) and must never be conflated with a failure.
#[derive(Debug)]
pub enum ApiResponse {
    Payload(Value),
    NoContent,
    Failure(StatusCode, String),
}

/// Performs a single authenticated GET against the Web API.
///
/// Pure pass-through: no retries, no state mutation. Transport-level errors
/// propagate as `reqwest::Error`; HTTP-level rejections come back as
/// `ApiResponse::Failure` with the upstream's status.
pub async fn get(config: &Config, path: &str, token: &str) -> Result<ApiResponse, reqwest::Error> {
    let api_url = format!("{uri}{path}", uri = &config.api_url, path = path);

    let client = Client::new();
    let response = client.get(&api_url).bearer_auth(token).send().await?;

    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return Ok(ApiResponse::NoContent);
    }
    if !status.is_success() {
        return Ok(ApiResponse::Failure(
            status,
            status
                .canonical_reason()
                .unwrap_or("Upstream request rejected")
                .to_string(),
        ));
    }

    let payload = response.json::<Value>().await?;
    Ok(ApiResponse::Payload(payload))
}

/// Current playback state of the authorized user.
pub async fn currently_playing(
    config: &Config,
    token: &str,
) -> Result<ApiResponse, reqwest::Error> {
    get(config, "/me/player/currently-playing", token).await
}

/// Listening history, most recent first.
pub async fn recently_played(
    config: &Config,
    token: &str,
    limit: u32,
) -> Result<ApiResponse, reqwest::Error> {
    let path = format!("/me/player/recently-played?limit={limit}", limit = limit);
    get(config, &path, token).await
}
