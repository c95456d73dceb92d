//! Client-side form checks run before anything reaches the network.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::types::{Credentials, Registration};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Per-field validation messages, keyed by payload field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message per field wins.
    pub fn add(&mut self, field: &str, message: &str) {
        self.fields
            .entry(field.to_owned())
            .or_insert_with(|| message.to_owned());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Check a registration form.
///
/// # Errors
///
/// Returns every failing field at once.
pub fn validate_registration(form: &Registration) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if is_blank(&form.full_name) {
        errors.add("full_name", "Full name is required");
    }

    check_email(&mut errors, &form.email);

    check_password(&mut errors, "password", &form.password);

    if form.confirm_password.is_empty() {
        errors.add("confirm_password", "Please confirm your password");
    } else if form.password != form.confirm_password {
        errors.add("confirm_password", "Passwords do not match");
    }

    if is_blank(&form.education) {
        errors.add("education", "Education is required");
    }
    if is_blank(&form.preferred_track) {
        errors.add("preferred_track", "Please select a preferred track");
    }

    errors.into_result()
}

/// Check a login form. Only presence is enforced; the server judges the rest.
///
/// # Errors
///
/// Returns every failing field at once.
pub fn validate_login(credentials: &Credentials) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if is_blank(&credentials.email) {
        errors.add("email", "Email is required");
    }
    if credentials.password.is_empty() {
        errors.add("password", "Password is required");
    }
    errors.into_result()
}

/// Check a lone email field, as used by the password-reset request.
///
/// # Errors
///
/// Returns the `email` failure, if any.
pub fn validate_email(email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_email(&mut errors, email);
    errors.into_result()
}

/// Check a replacement password, as used by the password-reset confirmation.
///
/// # Errors
///
/// Returns the `new_password` failure, if any.
pub fn validate_new_password(password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_password(&mut errors, "new_password", password);
    errors.into_result()
}

fn check_password(errors: &mut ValidationErrors, field: &str, password: &str) {
    if password.is_empty() {
        errors.add(field, "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(field, "Password must be at least 8 characters");
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if is_blank(email) {
        errors.add("email", "Email is required");
    } else if !looks_like_email(email) {
        errors.add("email", "Email is invalid");
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Loose `something@something.something` shape check.
///
/// Any whitespace-free run that has text before an `@` and a dot with text on
/// both sides after it passes.
#[must_use]
pub fn looks_like_email(value: &str) -> bool {
    value.split_whitespace().any(|token| {
        token.match_indices('@').any(|(at, _)| {
            let domain = &token[at + 1..];
            at > 0 && domain.match_indices('.').any(|(dot, _)| dot > 0 && dot + 1 < domain.len())
        })
    })
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
