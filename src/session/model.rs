//! Session data and its mapping onto store keys.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, SessionStore, USER_KEY};
use crate::error::ApiError;

/// Cached snapshot of the signed-in user.
///
/// Server-authoritative and display-only. Fields the client does not model are
/// kept in `extra` so the snapshot round-trips through storage unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserSummary {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self { email: email.into(), full_name: None, is_active: None, extra: Map::new() }
    }

    /// Name to greet the user with: full name when known, else the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }
}

/// Signals published by the HTTP client when the session changes underneath
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The access token was replaced by a refresh.
    Refreshed,
    /// Refresh failed; all session keys were cleared and the user must log in.
    Expired,
}

/// Tokens plus cached user, as read from a [`SessionStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserSummary>,
}

impl Session {
    /// Read all three keys. A user snapshot that fails to decode counts as absent.
    #[must_use]
    pub fn load(store: &dyn SessionStore) -> Self {
        let user = store.get(USER_KEY).and_then(|raw| match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable cached user");
                None
            }
        });
        Self { access_token: store.get(ACCESS_TOKEN_KEY), refresh_token: store.get(REFRESH_TOKEN_KEY), user }
    }

    /// `true` when both an access token and a user snapshot are present.
    #[must_use]
    pub fn is_restorable(&self) -> bool {
        self.access_token.is_some() && self.user.is_some()
    }

    /// Write a freshly issued session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if any key cannot be written.
    pub fn persist_login(
        store: &dyn SessionStore,
        access: &str,
        refresh: &str,
        user: &UserSummary,
    ) -> Result<(), ApiError> {
        store.set(ACCESS_TOKEN_KEY, access)?;
        store.set(REFRESH_TOKEN_KEY, refresh)?;
        Self::persist_user(store, user)
    }

    /// Replace the cached user snapshot. Tokens are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the snapshot cannot be written.
    pub fn persist_user(store: &dyn SessionStore, user: &UserSummary) -> Result<(), ApiError> {
        let json = serde_json::to_string(user).map_err(|e| ApiError::Storage(e.to_string()))?;
        store.set(USER_KEY, &json)
    }

    /// Remove every session key.
    ///
    /// Attempts all removals even if one fails and reports the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`ApiError::Storage`] encountered.
    pub fn clear(store: &dyn SessionStore) -> Result<(), ApiError> {
        let mut first_err = None;
        for key in SESSION_KEYS {
            if let Err(e) = store.remove(key) {
                tracing::warn!(key, error = %e, "failed to remove session key");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
