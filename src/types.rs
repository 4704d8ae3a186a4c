use serde::{Deserialize, Serialize};

/// Access/refresh token payload returned by the token endpoint, persisted
/// verbatim as the single token record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentlyPlayingResponse {
    pub is_playing: bool,
    pub progress_ms: Option<u64>,
    pub item: Option<TrackItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackItem {
    pub id: String,
    pub name: String,
    pub duration_ms: u64,
    pub artists: Vec<TrackArtist>,
    pub album: TrackAlbum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackAlbum {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyPlayedResponse {
    pub items: Vec<PlayHistoryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistoryItem {
    pub track: TrackItem,
    pub played_at: String,
}

/// Normalized `/now-playing` response body.
#[derive(Debug, Clone, Serialize)]
pub struct NowPlayingPayload {
    pub playing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artists: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl NowPlayingPayload {
    /// Body for the "nothing is playing" case (upstream 204).
    pub fn not_playing() -> Self {
        NowPlayingPayload {
            playing: false,
            track: None,
            artists: None,
            album: None,
            progress_ms: None,
            duration_ms: None,
        }
    }
}

/// Normalized `/recent` response body.
#[derive(Debug, Clone, Serialize)]
pub struct RecentPayload {
    pub items: Vec<RecentTrack>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentTrack {
    pub track: String,
    pub artists: Vec<String>,
    pub album: String,
    pub played_at: String,
}

/// `/health` response body. Status flags only; secret values never appear.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub api_key_configured: bool,
    pub credentials_configured: bool,
    pub oauth_complete: bool,
}
