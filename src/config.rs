//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

pub const API_URL_ENV: &str = "CAREERNEST_API_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "CAREERNEST_REQUEST_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_ENV: &str = "CAREERNEST_CONNECT_TIMEOUT_SECS";
pub const SESSION_FILE_ENV: &str = "CAREERNEST_SESSION_FILE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash. Endpoint paths are appended verbatim.
    pub base_url: String,
    pub timeouts: Timeouts,
    /// Where a file-backed session store keeps its keys, if configured.
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_URL.to_owned(), timeouts: Timeouts::default(), session_file: None }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `CAREERNEST_API_URL`: default `http://127.0.0.1:8000/api`
    /// - `CAREERNEST_REQUEST_TIMEOUT_SECS`: default 10
    /// - `CAREERNEST_CONNECT_TIMEOUT_SECS`: default 5
    /// - `CAREERNEST_SESSION_FILE`: no default
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ConfigParse`] for a malformed URL or timeout.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(env_var)
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ConfigParse`] for a malformed URL or timeout.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = parse_base_url(lookup(API_URL_ENV).as_deref())?;
        let timeouts = Timeouts {
            request_secs: parse_secs(&lookup, REQUEST_TIMEOUT_ENV, DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_secs(&lookup, CONNECT_TIMEOUT_ENV, DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        let session_file = lookup(SESSION_FILE_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self { base_url, timeouts, session_file })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        base_url.trim_end_matches('/').clone_into(&mut self.base_url);
        self
    }

    #[must_use]
    pub fn with_session_file(mut self, path: PathBuf) -> Self {
        self.session_file = Some(path);
        self
    }
}

fn env_var(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) => Some(value),
        Err(_) => None,
    }
}

fn parse_base_url(raw: Option<&str>) -> Result<String, ApiError> {
    let url = raw.unwrap_or(DEFAULT_API_URL).trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ApiError::ConfigParse(format!("{API_URL_ENV} must be an http(s) URL, got '{url}'")));
    }
    Ok(url.to_owned())
}

fn parse_secs<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ApiError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) => Err(ApiError::ConfigParse(format!("{key} must be greater than zero"))),
            Ok(secs) => Ok(secs),
            Err(e) => Err(ApiError::ConfigParse(format!("{key}: {e}"))),
        },
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
