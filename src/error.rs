//! Client error taxonomy.
//!
//! DESIGN
//! ======
//! Every failure a caller can see is an [`ApiError`]. Payloads are plain
//! strings so the error is `Clone`: a single refresh failure is handed to every
//! request waiting on the shared refresh future.
//!
//! PROPAGATION
//! ===========
//! Feature services never catch errors. Callers decide what the user sees; the
//! only errors swallowed inside the crate are logout notification failures.

use serde_json::Value;

use crate::auth::validation::ValidationErrors;

/// Stable machine-readable classification for client errors.
pub trait ErrorCode {
    /// Short error code such as `"E_NETWORK"`.
    fn error_code(&self) -> &'static str;

    /// `true` when retrying the same call later may succeed.
    fn retryable(&self) -> bool {
        false
    }
}

/// Errors produced by CareerNest client operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Client-side form checks failed; nothing was sent.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// No response was received from the backend.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded the configured deadline.
    #[error("request timed out")]
    Timeout,

    /// The backend answered with a non-2xx status.
    #[error("HTTP error: status {status}")]
    Http { status: u16, body: String },

    /// A 2xx response body did not match the expected shape.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// A request payload could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),

    /// The access token could not be refreshed; the session was cleared.
    #[error("session expired: {reason}")]
    SessionExpired { reason: String },

    /// The session store could not be read or written.
    #[error("session storage failed: {0}")]
    Storage(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::Network(_) => "E_NETWORK",
            Self::Timeout => "E_TIMEOUT",
            Self::Http { .. } => "E_HTTP",
            Self::Parse(_) => "E_PARSE",
            Self::Encode(_) => "E_ENCODE",
            Self::SessionExpired { .. } => "E_SESSION_EXPIRED",
            Self::Storage(_) => "E_STORAGE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout | Self::Http { status: 429 | 500..=599, .. })
    }
}

/// Body fields checked, in order, for a field-level message before falling back
/// to any other field.
const PRIORITY_FIELDS: [&str; 4] = ["email", "password", "detail", "non_field_errors"];

impl ApiError {
    /// HTTP status for [`ApiError::Http`], `None` otherwise.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for transport-level or server-side failures (network, timeout, 5xx).
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout | Self::Http { status: 500..=599, .. })
    }

    /// First human-readable message in an HTTP error body.
    ///
    /// Understands the `{"detail": "..."}` and `{"field": ["message", ...]}`
    /// shapes the backend returns for 4xx responses.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Http { body, .. } => extract_detail(body),
            _ => None,
        }
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) else {
        return None;
    };
    PRIORITY_FIELDS
        .iter()
        .filter_map(|key| fields.get(*key))
        .chain(fields.values())
        .find_map(first_message)
}

fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_message),
        _ => None,
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
