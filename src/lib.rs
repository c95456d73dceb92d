//! CareerNest API client.
//!
//! This crate owns everything below the UI of the CareerNest job platform:
//! the authenticated HTTP client that attaches bearer tokens and transparently
//! refreshes an expired access token, the persisted session store, the auth
//! state machine, and thin typed services for accounts, profiles, jobs, and
//! the AI career features. All matching and AI work happens server-side.
//!
//! ```no_run
//! # async fn demo() -> Result<(), careernest::ApiError> {
//! use std::sync::Arc;
//! use careernest::{AuthContext, ClientConfig, Credentials, HttpClient, MemoryStore};
//!
//! let config = ClientConfig::from_env()?;
//! let client = Arc::new(HttpClient::new(&config, Arc::new(MemoryStore::new()))?);
//! let auth = AuthContext::new(Arc::clone(&client));
//! auth.restore_session();
//! auth.login(&Credentials::new("a@b.com", "secret123")).await?;
//! let jobs = careernest::services::jobs::list(&client, &Default::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod net;
pub mod services;
pub mod session;

pub use auth::{AuthContext, AuthState, AuthStatus, Credentials, Registration, ValidationErrors};
pub use config::ClientConfig;
pub use error::{ApiError, ErrorCode};
pub use net::{HttpClient, Transport};
pub use session::{FileStore, MemoryStore, Session, SessionEvent, SessionStore, UserSummary};

#[cfg(test)]
#[path = "mock_test.rs"]
pub(crate) mod mock;
