use std::{sync::Arc, time::Duration};

use crate::{
    management::store::{KvStore, StoreError},
    types::Token,
};

/// Fixed slot the single token record lives under.
const TOKEN_RECORD_KEY: &str = "spotify_tokens";

/// Token records expire with the upstream access token.
const TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Identifier for the relay's sole user.
pub const DEFAULT_USER: &str = "default";

/// Persistence of the access/refresh token payload.
///
/// Exactly one record exists at a time; a new successful exchange overwrites
/// it. Presence of a non-expired record is the sole signal that setup is
/// complete. The methods accept a user identifier so a per-user key scheme
/// can be introduced later; the current single-user layout maps every
/// identifier to the same fixed slot.
pub struct TokenManager {
    store: Arc<dyn KvStore>,
}

impl TokenManager {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Stores the token payload verbatim, replacing any previous record.
    pub async fn save(&self, _user: &str, token: &Token) -> Result<(), StoreError> {
        let json = serde_json::to_string(token)?;
        self.store
            .put(TOKEN_RECORD_KEY, &json, Some(TOKEN_TTL))
            .await
    }

    /// Loads the stored record. `None` means setup was never completed or
    /// the record has expired; callers must report unauthenticated.
    pub async fn load(&self, _user: &str) -> Result<Option<Token>, StoreError> {
        match self.store.get(TOKEN_RECORD_KEY).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Whether a live token record exists.
    pub async fn is_authorized(&self, user: &str) -> Result<bool, StoreError> {
        Ok(self.load(user).await?.is_some())
    }
}
