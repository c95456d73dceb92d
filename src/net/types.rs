//! Transport-neutral request/response types.
//!
//! Requests are plain data so the interceptor pipeline can re-issue them and
//! tests can assert on exactly what went over the wire.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::ValidationErrors;
use crate::error::ApiError;

// =============================================================================
// REQUEST
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file_name: String, mime: String, bytes: Vec<u8> },
}

impl FormPart {
    #[must_use]
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        Self::Text { name: name.to_owned(), value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Vec<FormPart>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL, e.g. `/jobs/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Bearer token attached by the request interceptor.
    pub bearer: Option<String>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: RequestBody::Empty, bearer: None }
    }

    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    #[must_use]
    pub fn with_multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// The `Authorization` header value this request carries, if any.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.bearer.as_ref().map(|token| format!("Bearer {token}"))
    }

    /// Body as JSON, for assertions and logging.
    #[must_use]
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// Serialize a payload into a JSON request body.
///
/// # Errors
///
/// Returns [`ApiError::Encode`] if the payload cannot be represented as JSON.
pub fn encode_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))
}

/// Flatten a serializable struct into query pairs.
///
/// `null` fields are skipped, strings are passed through, other scalars use
/// their JSON text. Arrays repeat the key once per element.
///
/// # Errors
///
/// Returns [`ApiError::Encode`] if `params` does not serialize to a JSON object.
pub fn query_pairs<T: Serialize + ?Sized>(params: &T) -> Result<Vec<(String, String)>, ApiError> {
    let Value::Object(fields) = encode_json(params)? else {
        return Err(ApiError::Encode("query parameters must serialize to an object".into()));
    };
    let mut pairs = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                pairs.extend(items.iter().filter_map(scalar_text).map(|text| (key.clone(), text)));
            }
            other => {
                if let Some(text) = scalar_text(&other) {
                    pairs.push((key, text));
                }
            }
        }
    }
    Ok(pairs)
}

/// Percent-encode one URL path segment.
///
/// `/` and every other reserved byte are escaped, so a value cannot reach a
/// different endpoint. Empty, `.` and `..` segments are rejected because URL
/// parsing would collapse them.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] keyed by `field` for an unusable segment.
pub fn path_segment(field: &str, raw: &str) -> Result<String, ApiError> {
    if matches!(raw.trim(), "" | "." | "..") {
        let mut errors = ValidationErrors::new();
        errors.add(field, "Not a valid path segment");
        return Err(ApiError::Validation(errors));
    }
    Ok(urlencoding::encode(raw).into_owned())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let text = if self.body.trim().is_empty() { "null" } else { self.body.as_str() };
        serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
    }

    #[must_use]
    pub fn into_error(self) -> ApiError {
        ApiError::Http { status: self.status, body: self.body }
    }
}

// =============================================================================
// ATTEMPT
// =============================================================================

/// A request moving through the interceptor pipeline.
///
/// `attempt` is 0 for the original send and 1 for the single retry after a
/// token refresh. There is no way back from 1 to 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    request: ApiRequest,
    attempt: u8,
}

impl Attempt {
    #[must_use]
    pub fn first(request: ApiRequest) -> Self {
        Self { request, attempt: 0 }
    }

    #[must_use]
    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    #[must_use]
    pub fn number(&self) -> u8 {
        self.attempt
    }

    #[must_use]
    pub fn is_retry(&self) -> bool {
        self.attempt > 0
    }

    /// Re-issue the request with a fresh access token.
    #[must_use]
    pub fn into_retry(self, access_token: String) -> Self {
        Self { request: self.request.with_bearer(access_token), attempt: 1 }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
