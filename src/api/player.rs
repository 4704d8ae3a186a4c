use axum::{extract::State, response::Json};

use crate::{
    error::ApiError,
    management::{DEFAULT_USER, TokenManager},
    server::AppState,
    spotify::player::{self, ApiResponse},
    types::{
        CurrentlyPlayingResponse, NowPlayingPayload, RecentPayload, RecentTrack,
        RecentlyPlayedResponse, Token,
    },
    warning,
};

/// How many history items `/recent` relays.
const RECENT_LIMIT: u32 = 10;

/// GET `/now-playing`: current playback, or `{"playing":false}` when the
/// upstream reports nothing playing.
pub async fn now_playing(State(state): State<AppState>) -> Result<Json<NowPlayingPayload>, ApiError> {
    let token = stored_token(&state).await?;

    match player::currently_playing(&state.config, &token.access_token).await? {
        ApiResponse::NoContent => Ok(Json(NowPlayingPayload::not_playing())),
        ApiResponse::Failure(status, message) => {
            warning!("Currently-playing call rejected: {} {}", status, message);
            Err(ApiError::Upstream(status, message))
        }
        ApiResponse::Payload(payload) => {
            let parsed: CurrentlyPlayingResponse = serde_json::from_value(payload)?;
            Ok(Json(normalize_now_playing(parsed)))
        }
    }
}

/// GET `/recent`: the last played items, most recent first.
pub async fn recent(State(state): State<AppState>) -> Result<Json<RecentPayload>, ApiError> {
    let token = stored_token(&state).await?;

    match player::recently_played(&state.config, &token.access_token, RECENT_LIMIT).await? {
        ApiResponse::NoContent => Ok(Json(RecentPayload { items: Vec::new() })),
        ApiResponse::Failure(status, message) => {
            warning!("Recently-played call rejected: {} {}", status, message);
            Err(ApiError::Upstream(status, message))
        }
        ApiResponse::Payload(payload) => {
            let parsed: RecentlyPlayedResponse = serde_json::from_value(payload)?;
            let items = parsed
                .items
                .into_iter()
                .take(RECENT_LIMIT as usize)
                .map(|item| RecentTrack {
                    track: item.track.name,
                    artists: item.track.artists.into_iter().map(|a| a.name).collect(),
                    album: item.track.album.name,
                    played_at: item.played_at,
                })
                .collect();
            Ok(Json(RecentPayload { items }))
        }
    }
}

/// Loads the stored token record, translating its absence into the
/// setup-incomplete 401 every data endpoint must produce.
async fn stored_token(state: &AppState) -> Result<Token, ApiError> {
    let tokens = TokenManager::new(state.store.clone());
    tokens.load(DEFAULT_USER).await?.ok_or_else(|| {
        ApiError::Unauthorized(
            "Setup incomplete: no stored token. Complete the OAuth flow at /setup".to_string(),
        )
    })
}

fn normalize_now_playing(parsed: CurrentlyPlayingResponse) -> NowPlayingPayload {
    match parsed.item {
        Some(item) => NowPlayingPayload {
            playing: parsed.is_playing,
            track: Some(item.name),
            artists: Some(item.artists.into_iter().map(|a| a.name).collect()),
            album: Some(item.album.name),
            progress_ms: parsed.progress_ms,
            duration_ms: Some(item.duration_ms),
        },
        // Playback without a track item (private session, ad break).
        None => NowPlayingPayload {
            playing: parsed.is_playing,
            ..NowPlayingPayload::not_playing()
        },
    }
}
