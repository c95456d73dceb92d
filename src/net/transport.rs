//! Outbound HTTP transport.
//!
//! DESIGN
//! ======
//! [`Transport`] is the only place bytes leave the process. The interceptor
//! pipeline in `client.rs` sits on top of it and the refresh call talks to it
//! directly, so a refresh never re-enters the interceptors.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};

use super::types::{ApiRequest, ApiResponse, FormPart, Method, RequestBody};
use crate::config::ClientConfig;
use crate::error::ApiError;

/// Provider-neutral async transport. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return whatever status the backend answered with.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] or [`ApiError::Timeout`] when no response
    /// arrives. Non-2xx responses are returned as `Ok`.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

// =============================================================================
// REQWEST TRANSPORT
// =============================================================================

pub struct ReqwestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Build a transport with the configured base URL and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS backend fails to initialize.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url(&request.path);
        let mut builder = self.http.request(reqwest_method(request.method), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        tracing::debug!(method = %request.method, %url, "sending request");
        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        tracing::debug!(method = %request.method, %url, status, "received response");
        Ok(ApiResponse { status, body })
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File { name, file_name, mime, bytes } => {
                let file = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)
                    .map_err(|e| ApiError::Encode(format!("invalid mime type '{mime}': {e}")))?;
                form.part(name.clone(), file)
            }
        };
    }
    Ok(form)
}

fn classify(err: reqwest::Error) -> ApiError {
    if err.is_timeout() { ApiError::Timeout } else { ApiError::Network(err.to_string()) }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
