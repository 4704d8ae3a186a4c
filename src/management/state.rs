use std::{sync::Arc, time::Duration};

use crate::{management::store::KvStore, management::store::StoreError, utils};

/// Store-key prefix for pending CSRF state tokens.
pub const STATE_KEY_PREFIX: &str = "oauth_state_";

/// Literal marker stored for a pending state. The value carries no data;
/// presence of the key is the whole signal.
const STATE_MARKER: &str = "pending";

/// How long an authorization attempt stays redeemable.
const STATE_TTL: Duration = Duration::from_secs(600);

/// Lifecycle of CSRF state tokens binding an authorization redirect to the
/// callback that completes it.
///
/// Every `Initiate` issues a fresh random token; concurrent attempts each
/// get their own key and stay independently redeemable. A token that is
/// never redeemed simply expires out of the store.
pub struct StateManager {
    store: Arc<dyn KvStore>,
}

impl StateManager {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Generates and persists a new state token, returning its value.
    pub async fn issue(&self) -> Result<String, StoreError> {
        let state = utils::generate_state_token();
        self.store
            .put(&Self::key(&state), STATE_MARKER, Some(STATE_TTL))
            .await?;
        Ok(state)
    }

    /// Checks whether a state value corresponds to a live pending entry.
    pub async fn is_pending(&self, state: &str) -> Result<bool, StoreError> {
        Ok(self.store.get(&Self::key(state)).await?.is_some())
    }

    /// Removes a redeemed state entry. Called only after the token exchange
    /// succeeded, so a failed exchange leaves the entry to expire on its own.
    pub async fn consume(&self, state: &str) -> Result<(), StoreError> {
        self.store.delete(&Self::key(state)).await
    }

    fn key(state: &str) -> String {
        format!("{}{}", STATE_KEY_PREFIX, state)
    }
}
