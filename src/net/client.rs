//! Authenticated HTTP client with interceptor-style token refresh.
//!
//! ARCHITECTURE
//! ============
//! Every call runs through one pipeline:
//!
//! 1. Request phase: attach `Authorization: Bearer <access>` when the session
//!    store holds an access token.
//! 2. Send through the [`Transport`].
//! 3. Response phase: a 401 on the first attempt recovers a fresh access
//!    token and re-sends exactly once. This holds even when no bearer was
//!    sent, so a partial session (refresh token without access token) is
//!    either recovered or wiped. Credential endpoints such as login are the
//!    exception: their 401 means bad credentials and passes through.
//!    Everything else passes through unchanged.
//!
//! Token recovery order: if another request already rotated the access token,
//! reuse it; otherwise join or start the single-flight refresh. A missing or
//! rejected refresh token clears the whole session and publishes
//! [`SessionEvent::Expired`].
//!
//! ERROR HANDLING
//! ==============
//! The original request fails with [`ApiError::SessionExpired`] when recovery
//! fails. The refresh call itself goes straight to the transport, so its own
//! 401 can never recurse into the pipeline.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::broadcast;

use super::refresh::{RefreshFuture, RefreshGuard};
use super::transport::{ReqwestTransport, Transport};
use super::types::{ApiRequest, ApiResponse, Attempt, FormPart, Method, encode_json};
use crate::config::ClientConfig;
use crate::error::{ApiError, ErrorCode};
use crate::services::accounts::CREDENTIAL_PATHS;
use crate::session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, Session, SessionEvent, SessionStore};

pub const TOKEN_REFRESH_PATH: &str = "/accounts/token/refresh/";

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, serde::Deserialize)]
struct RefreshResponse {
    access: String,
    /// Present when the backend rotates refresh tokens.
    #[serde(default)]
    refresh: Option<String>,
}

pub struct HttpClient {
    transport: Arc<dyn Transport>,
    store: Arc<dyn SessionStore>,
    refresh: RefreshGuard,
    events: broadcast::Sender<SessionEvent>,
}

impl HttpClient {
    /// Build a client backed by `reqwest` with the configured base URL and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config)?;
        tracing::info!(base_url = transport.base_url(), "careernest client ready");
        Ok(Self::with_transport(Arc::new(transport), store))
    }

    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>, store: Arc<dyn SessionStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { transport, store, refresh: RefreshGuard::new(), events }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Receive [`SessionEvent`]s published by the response interceptor.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // VERBS
    // =========================================================================

    /// # Errors
    ///
    /// See [`HttpClient::execute`]; also [`ApiError::Parse`] for an unexpected body.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send_json(ApiRequest::new(Method::Get, path)).await
    }

    /// # Errors
    ///
    /// See [`HttpClient::execute`]; also [`ApiError::Parse`] for an unexpected body.
    pub async fn get_with_query<R: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<R, ApiError> {
        self.send_json(ApiRequest::new(Method::Get, path).with_query(query))
            .await
    }

    /// # Errors
    ///
    /// See [`HttpClient::execute`]; also [`ApiError::Encode`] / [`ApiError::Parse`].
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_with_body(Method::Post, path, body).await
    }

    /// # Errors
    ///
    /// See [`HttpClient::execute`]; also [`ApiError::Encode`] / [`ApiError::Parse`].
    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_with_body(Method::Put, path, body).await
    }

    /// # Errors
    ///
    /// See [`HttpClient::execute`]; also [`ApiError::Encode`] / [`ApiError::Parse`].
    pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send_with_body(Method::Patch, path, body).await
    }

    /// # Errors
    ///
    /// See [`HttpClient::execute`]; also [`ApiError::Parse`] for an unexpected body.
    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send_json(ApiRequest::new(Method::Delete, path)).await
    }

    /// Send a `multipart/form-data` body with any verb.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::execute`]; also [`ApiError::Parse`] for an unexpected body.
    pub async fn send_multipart<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        parts: Vec<FormPart>,
    ) -> Result<R, ApiError> {
        self.send_json(ApiRequest::new(method, path).with_multipart(parts))
            .await
    }

    async fn send_with_body<B, R>(&self, method: Method, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = ApiRequest::new(method, path).with_json(encode_json(body)?);
        self.send_json(request).await
    }

    /// Run a request through the pipeline and decode the 2xx body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::execute`]; also [`ApiError::Parse`] for an unexpected body.
    pub async fn send_json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        self.execute(request).await?.json()
    }

    // =========================================================================
    // PIPELINE
    // =========================================================================

    /// Run a request through both interceptors and return the 2xx response.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Network`] / [`ApiError::Timeout`] from the transport.
    /// - [`ApiError::Http`] for non-2xx responses, including a 401 on the retry.
    /// - [`ApiError::SessionExpired`] when the access token could not be refreshed.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut attempt = Attempt::first(self.authorize(request));
        loop {
            let response = self.transport.send(attempt.request()).await?;
            if response.is_success() {
                return Ok(response);
            }
            if response.status != 401 || attempt.is_retry() || is_credential_path(&attempt.request().path) {
                return Err(response.into_error());
            }

            tracing::debug!(path = %attempt.request().path, "request unauthorized; recovering");
            let used = attempt.request().bearer.clone();
            let token = self.recover_access_token(used.as_deref()).await?;
            attempt = attempt.into_retry(token);
        }
    }

    /// Request phase: attach the stored access token, if any.
    fn authorize(&self, request: ApiRequest) -> ApiRequest {
        match self.store.get(ACCESS_TOKEN_KEY) {
            Some(token) => request.with_bearer(token),
            None => request,
        }
    }

    /// `used` is the bearer the rejected request carried, if any.
    async fn recover_access_token(&self, used: Option<&str>) -> Result<String, ApiError> {
        if let Some(current) = self.store.get(ACCESS_TOKEN_KEY) {
            if used != Some(current.as_str()) {
                tracing::debug!("access token already rotated by a concurrent refresh");
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.store.get(REFRESH_TOKEN_KEY) else {
            let reason = "no refresh token available".to_owned();
            return Err(expire_session(self.store.as_ref(), &self.events, reason));
        };

        self.refresh
            .run(|| self.refresh_future(refresh_token))
            .await
    }

    fn refresh_future(&self, refresh_token: String) -> RefreshFuture {
        let transport = Arc::clone(&self.transport);
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        Box::pin(async move { refresh_access_token(transport, store, events, refresh_token).await })
    }
}

/// A 401 from a credential endpoint means the submitted credentials were
/// wrong; there is no session to recover.
fn is_credential_path(path: &str) -> bool {
    CREDENTIAL_PATHS.iter().any(|prefix| path.starts_with(prefix))
}

/// Exchange the refresh token for a new access token and persist it.
async fn refresh_access_token(
    transport: Arc<dyn Transport>,
    store: Arc<dyn SessionStore>,
    events: broadcast::Sender<SessionEvent>,
    refresh_token: String,
) -> Result<String, ApiError> {
    tracing::debug!("refreshing access token");
    let request = ApiRequest::new(Method::Post, TOKEN_REFRESH_PATH).with_json(json!({ "refresh": refresh_token }));

    let outcome = match transport.send(&request).await {
        Ok(response) if response.is_success() => response.json::<RefreshResponse>(),
        Ok(response) => Err(response.into_error()),
        Err(e) => Err(e),
    }
    .and_then(|tokens| {
        store.set(ACCESS_TOKEN_KEY, &tokens.access)?;
        if let Some(rotated) = &tokens.refresh {
            store.set(REFRESH_TOKEN_KEY, rotated)?;
        }
        Ok(tokens.access)
    });

    match outcome {
        Ok(access) => {
            tracing::info!("access token refreshed");
            publish(&events, SessionEvent::Refreshed);
            Ok(access)
        }
        Err(e) => {
            tracing::warn!(error = %e, code = e.error_code(), "token refresh failed");
            Err(expire_session(store.as_ref(), &events, e.to_string()))
        }
    }
}

/// Failed state: wipe the session and tell listeners the user must log in again.
fn expire_session(store: &dyn SessionStore, events: &broadcast::Sender<SessionEvent>, reason: String) -> ApiError {
    if let Err(e) = Session::clear(store) {
        tracing::warn!(error = %e, "session clear after failed refresh was incomplete");
    }
    publish(events, SessionEvent::Expired);
    ApiError::SessionExpired { reason }
}

fn publish(events: &broadcast::Sender<SessionEvent>, event: SessionEvent) {
    if events.send(event).is_err() {
        tracing::trace!(?event, "no session listeners");
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
