//! Account endpoints: sign-up, activation, login/logout, and password reset.
//!
//! These are plain request/response wrappers. Session bookkeeping around
//! login and logout lives in [`crate::auth::AuthContext`].

use serde_json::{Value, json};

use crate::auth::types::{Credentials, LoginResponse, Registration};
use crate::auth::validation;
use crate::error::ApiError;
use crate::net::{HttpClient, path_segment};

pub const REGISTER_PATH: &str = "/accounts/register/";
pub const LOGIN_PATH: &str = "/accounts/login/";
pub const LOGOUT_PATH: &str = "/accounts/logout/";
pub const PASSWORD_RESET_PATH: &str = "/accounts/password-reset/";
pub const ACTIVATE_PATH: &str = "/accounts/activate/";
pub const PASSWORD_RESET_CONFIRM_PATH: &str = "/accounts/password-reset-confirm/";

/// Endpoints that authenticate by what the caller submits rather than by a
/// session. A 401 from one of these is a bad credential, not an expired token.
pub const CREDENTIAL_PATHS: &[&str] =
    &[REGISTER_PATH, LOGIN_PATH, PASSWORD_RESET_PATH, ACTIVATE_PATH, PASSWORD_RESET_CONFIRM_PATH];

/// Create an account. The user must activate it from the emailed link
/// before logging in.
///
/// # Errors
///
/// [`ApiError::Validation`] before any I/O, otherwise whatever the client returns.
pub async fn register(client: &HttpClient, form: &Registration) -> Result<Value, ApiError> {
    form.validate().map_err(ApiError::Validation)?;
    client.post(REGISTER_PATH, form).await
}

/// # Errors
///
/// Propagates client errors; an expired link is an [`ApiError::Http`].
pub async fn activate(client: &HttpClient, uid: &str, token: &str) -> Result<Value, ApiError> {
    client.get(&link_path(ACTIVATE_PATH, uid, token)?).await
}

/// Exchange credentials for a token pair and user snapshot. Nothing is persisted.
///
/// # Errors
///
/// [`ApiError::Validation`] before any I/O, otherwise whatever the client returns.
pub async fn login(client: &HttpClient, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
    credentials.validate().map_err(ApiError::Validation)?;
    client.post(LOGIN_PATH, credentials).await
}

/// Ask the backend to invalidate `refresh_token`.
///
/// # Errors
///
/// Propagates client errors. Callers logging out should not let them block
/// local cleanup.
pub async fn logout(client: &HttpClient, refresh_token: &str) -> Result<(), ApiError> {
    let _ack: Value = client.post(LOGOUT_PATH, &json!({ "refresh": refresh_token })).await?;
    Ok(())
}

/// # Errors
///
/// [`ApiError::Validation`] for a malformed email, otherwise client errors.
pub async fn request_password_reset(client: &HttpClient, email: &str) -> Result<Value, ApiError> {
    validation::validate_email(email).map_err(ApiError::Validation)?;
    client.post(PASSWORD_RESET_PATH, &json!({ "email": email })).await
}

/// # Errors
///
/// [`ApiError::Validation`] for a too-short password, otherwise client errors.
pub async fn confirm_password_reset(
    client: &HttpClient,
    uid: &str,
    token: &str,
    new_password: &str,
) -> Result<Value, ApiError> {
    validation::validate_new_password(new_password).map_err(ApiError::Validation)?;
    let path = link_path(PASSWORD_RESET_CONFIRM_PATH, uid, token)?;
    client.post(&path, &json!({ "new_password": new_password })).await
}

/// `{base}{uid}/{token}/` for the links the backend emails out.
fn link_path(base: &str, uid: &str, token: &str) -> Result<String, ApiError> {
    Ok(format!("{base}{}/{}/", path_segment("uid", uid)?, path_segment("token", token)?))
}

#[cfg(test)]
#[path = "accounts_test.rs"]
mod tests;
