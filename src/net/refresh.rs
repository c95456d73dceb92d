//! Single-flight access-token refresh.
//!
//! DESIGN
//! ======
//! The first request to see a 401 starts the refresh; any request that hits a
//! 401 while that refresh is in flight awaits the same shared future instead
//! of spending the refresh token a second time. The slot is emptied once the
//! shared future resolves, so a later expiry starts a fresh refresh.

use std::sync::{Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::error::ApiError;

/// Resolves to the new access token.
pub type RefreshFuture = BoxFuture<'static, Result<String, ApiError>>;

#[derive(Default)]
pub struct RefreshGuard {
    in_flight: Mutex<Option<Shared<RefreshFuture>>>,
}

impl RefreshGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` while a refresh is being awaited.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Join the in-flight refresh, or start one with `start` if none is running.
    ///
    /// # Errors
    ///
    /// Returns whatever error the shared refresh future resolved to.
    pub async fn run<F>(&self, start: F) -> Result<String, ApiError>
    where
        F: FnOnce() -> RefreshFuture,
    {
        let shared = {
            let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = slot.as_ref() {
                tracing::debug!("joining in-flight token refresh");
                existing.clone()
            } else {
                let fresh = start().shared();
                *slot = Some(fresh.clone());
                fresh
            }
        };

        let result = shared.clone().await;

        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&shared)) {
            *slot = None;
        }
        result
    }
}

#[cfg(test)]
#[path = "refresh_test.rs"]
mod tests;
