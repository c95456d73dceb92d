//! Client-side authentication state machine.
//!
//! DESIGN
//! ======
//! `AuthContext` is an injected object, not a global: whoever builds the
//! [`HttpClient`] builds the context around it and hands both to the UI layer.
//! State is published on a `watch` channel so any number of views can follow
//! it.
//!
//! LIFECYCLE
//! =========
//! ```text
//! new() ──► Loading ──restore_session()──► Authenticated | Unauthenticated
//!                                   login() ─► Authenticated
//!                        logout() / Expired ─► Unauthenticated
//! ```
//! `watch_session()` starts a listener that reacts to interceptor events;
//! `teardown()` stops it.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use super::types::{Credentials, LoginResponse, Registration};
use crate::error::ApiError;
use crate::net::HttpClient;
use crate::services::accounts;
use crate::session::{REFRESH_TOKEN_KEY, Session, SessionEvent, UserSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub status: AuthStatus,
    pub user: Option<UserSummary>,
}

impl AuthState {
    #[must_use]
    pub fn loading() -> Self {
        Self { status: AuthStatus::Loading, user: None }
    }

    #[must_use]
    pub fn authenticated(user: UserSummary) -> Self {
        Self { status: AuthStatus::Authenticated, user: Some(user) }
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self { status: AuthStatus::Unauthenticated, user: None }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }
}

pub struct AuthContext {
    client: Arc<HttpClient>,
    state: Arc<watch::Sender<AuthState>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl AuthContext {
    /// Create a context in the `Loading` state.
    #[must_use]
    pub fn new(client: Arc<HttpClient>) -> Self {
        let (state, _) = watch::channel(AuthState::loading());
        Self { client, state: Arc::new(state), listener: Mutex::new(None) }
    }

    #[must_use]
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Leave `Loading` based on what the session store holds.
    ///
    /// Authenticated only when both an access token and a readable user
    /// snapshot are stored.
    pub fn restore_session(&self) -> AuthState {
        let session = Session::load(self.client.store().as_ref());
        let restorable = session.is_restorable();
        let next = match session.user {
            Some(user) if restorable => AuthState::authenticated(user),
            _ => AuthState::unauthenticated(),
        };
        tracing::debug!(status = ?next.status, "session restored");
        self.state.send_replace(next.clone());
        next
    }

    /// Create an account. Does not change the session; activation comes first.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for local form failures, otherwise client errors.
    pub async fn register(&self, form: &Registration) -> Result<Value, ApiError> {
        accounts::register(&self.client, form).await
    }

    /// # Errors
    ///
    /// Propagates client errors.
    pub async fn activate_account(&self, uid: &str, token: &str) -> Result<Value, ApiError> {
        accounts::activate(&self.client, uid, token).await
    }

    /// Log in, persist the token pair and user, and become `Authenticated`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for local form failures, client errors from the
    /// login call, or [`ApiError::Storage`] if the session cannot be saved.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let response = accounts::login(&self.client, credentials).await?;
        Session::persist_login(self.client.store().as_ref(), &response.access, &response.refresh, &response.user)?;
        tracing::info!(email = %response.user.email, "logged in");
        self.state.send_replace(AuthState::authenticated(response.user.clone()));
        Ok(response)
    }

    /// Log out. Always ends `Unauthenticated` with an empty store; server and
    /// storage failures are logged, never returned.
    pub async fn logout(&self) {
        let store = self.client.store();
        match store.get(REFRESH_TOKEN_KEY) {
            Some(refresh) => {
                if let Err(e) = accounts::logout(&self.client, &refresh).await {
                    tracing::warn!(error = %e, "logout notification failed; clearing session anyway");
                }
            }
            None => tracing::debug!("no refresh token; skipping logout notification"),
        }
        if let Err(e) = Session::clear(store.as_ref()) {
            tracing::warn!(error = %e, "session clear on logout was incomplete");
        }
        self.state.send_replace(AuthState::unauthenticated());
        tracing::info!("logged out");
    }

    /// Replace the cached user in memory and in storage. Tokens are untouched.
    ///
    /// # Errors
    ///
    /// [`ApiError::Storage`] if the snapshot cannot be written; in-memory state
    /// is left unchanged in that case.
    pub fn update_user(&self, user: UserSummary) -> Result<(), ApiError> {
        Session::persist_user(self.client.store().as_ref(), &user)?;
        self.state.send_modify(|state| state.user = Some(user));
        Ok(())
    }

    /// # Errors
    ///
    /// [`ApiError::Validation`] for a malformed email, otherwise client errors.
    pub async fn request_password_reset(&self, email: &str) -> Result<Value, ApiError> {
        accounts::request_password_reset(&self.client, email).await
    }

    /// # Errors
    ///
    /// [`ApiError::Validation`] for a too-short password, otherwise client errors.
    pub async fn confirm_password_reset(&self, uid: &str, token: &str, new_password: &str) -> Result<Value, ApiError> {
        accounts::confirm_password_reset(&self.client, uid, token, new_password).await
    }

    // =========================================================================
    // SESSION EVENTS
    // =========================================================================

    /// React to a signal from the response interceptor.
    pub fn apply_event(&self, event: SessionEvent) {
        apply_event(&self.state, event);
    }

    /// Follow interceptor events on a background task until [`teardown`](Self::teardown).
    ///
    /// Calling it again while a listener is running does nothing.
    pub fn watch_session(&self) {
        let mut slot = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        let events = self.client.subscribe();
        let state = Arc::clone(&self.state);
        *slot = Some(tokio::spawn(listen(events, state)));
    }

    /// Stop the session listener, if one is running.
    pub fn teardown(&self) {
        if let Some(handle) = self.listener.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
            tracing::debug!("session listener stopped");
        }
    }
}

impl Drop for AuthContext {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn listen(mut events: broadcast::Receiver<SessionEvent>, state: Arc<watch::Sender<AuthState>>) {
    loop {
        match events.recv().await {
            Ok(event) => apply_event(&state, event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "session listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn apply_event(state: &watch::Sender<AuthState>, event: SessionEvent) {
    match event {
        SessionEvent::Refreshed => tracing::debug!("access token refreshed"),
        SessionEvent::Expired => {
            tracing::info!("session expired; login required");
            state.send_replace(AuthState::unauthenticated());
        }
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
