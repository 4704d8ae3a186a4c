//! Configuration management for the Spotify Relay Server.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. All values are collected once at
//! startup into a [`Config`] struct that is injected into the router state,
//! so handlers and tests never read the process environment directly.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! Credentials are optional on purpose: a freshly deployed relay has no
//! client id, client secret or API key yet, and the HTTP surface must be able
//! to report that state instead of refusing to start.

use std::{env, path::PathBuf};

use crate::Res;

/// Fixed path the upstream authorization server redirects back to.
///
/// The redirect URI sent during `Initiate` and during the token exchange is
/// the request origin joined with this path; Spotify validates both for an
/// exact match.
pub const CALLBACK_PATH: &str = "/callback";

/// Default OAuth scope set: read currently playing, read recently played,
/// read playback state. Nothing here can mutate the user's account.
pub const DEFAULT_SCOPE: &str =
    "user-read-currently-playing user-read-recently-played user-read-playback-state";

/// Runtime configuration, read once at startup.
///
/// Absence of `api_key` or of either client credential is a valid, detectable
/// state ("not configured") surfaced through `/health` and the setup pages.
/// All fields are immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct Config {
    /// Static key protected endpoints compare the bearer credential against.
    pub api_key: Option<String>,
    /// Spotify application client identifier.
    pub client_id: Option<String>,
    /// Spotify application client secret.
    pub client_secret: Option<String>,
    /// Deployment label reported by `/health` (e.g. "development").
    pub environment: String,
    /// Address the HTTP listener binds to.
    pub server_address: String,
    /// Base URL of the authorization endpoint users are redirected to.
    pub auth_url: String,
    /// URL of the token exchange endpoint.
    pub token_url: String,
    /// Base URL of the Spotify Web API.
    pub api_url: String,
    /// OAuth scope set requested during authorization.
    pub scope: String,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// A `.env` file is looked up first in the platform-specific local data
    /// directory (`sporelay/.env`), then in the working directory; both are
    /// optional. Real environment variables always win over file contents.
    ///
    /// # Environment Variables
    ///
    /// - `API_KEY` - static key for the authentication gate (optional)
    /// - `SPOTIFY_API_AUTH_CLIENT_ID` - client identifier (optional)
    /// - `SPOTIFY_API_AUTH_CLIENT_SECRET` - client secret (optional)
    /// - `ENVIRONMENT` - deployment label, defaults to `development`
    /// - `SERVER_ADDRESS` - bind address, defaults to `127.0.0.1:8080`
    /// - `SPOTIFY_API_AUTH_URL` - authorization endpoint override
    /// - `SPOTIFY_API_TOKEN_URL` - token endpoint override
    /// - `SPOTIFY_API_URL` - Web API base URL override
    /// - `SPOTIFY_API_AUTH_SCOPE` - scope set override
    ///
    /// # Example
    ///
    /// ```
    /// let cfg = Config::from_env().await?;
    /// println!("binding {}", cfg.server_address);
    /// ```
    pub async fn from_env() -> Res<Self> {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("sporelay/.env");
        if path.is_file() {
            dotenv::from_path(&path).map_err(|e| e.to_string())?;
        } else {
            // Fall back to a .env next to the working directory, if any.
            dotenv::dotenv().ok();
        }

        Ok(Self::from_current_env())
    }

    /// Builds a `Config` from whatever is already in the environment,
    /// without touching any `.env` file.
    pub fn from_current_env() -> Self {
        Config {
            api_key: env::var("API_KEY").ok().filter(|v| !v.is_empty()),
            client_id: env::var("SPOTIFY_API_AUTH_CLIENT_ID")
                .ok()
                .filter(|v| !v.is_empty()),
            client_secret: env::var("SPOTIFY_API_AUTH_CLIENT_SECRET")
                .ok()
                .filter(|v| !v.is_empty()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            server_address: env::var("SERVER_ADDRESS")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            auth_url: env::var("SPOTIFY_API_AUTH_URL")
                .unwrap_or_else(|_| "https://accounts.spotify.com/authorize".to_string()),
            token_url: env::var("SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string()),
            api_url: env::var("SPOTIFY_API_URL")
                .unwrap_or_else(|_| "https://api.spotify.com/v1".to_string()),
            scope: env::var("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|_| DEFAULT_SCOPE.to_string()),
        }
    }

    /// Returns the client credentials when both halves are configured.
    ///
    /// The OAuth flow cannot start with only one of them, so callers get
    /// either the full pair or nothing.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Some((id, secret)),
            _ => None,
        }
    }
}

impl Default for Config {
    /// Unconfigured instance with stock Spotify endpoints. Tests start from
    /// this and fill in what they exercise.
    fn default() -> Self {
        Config {
            api_key: None,
            client_id: None,
            client_secret: None,
            environment: "development".to_string(),
            server_address: "127.0.0.1:8080".to_string(),
            auth_url: "https://accounts.spotify.com/authorize".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            api_url: "https://api.spotify.com/v1".to_string(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }
}
