//! Account payloads exchanged with `/accounts/*`.

use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationErrors};
use crate::session::UserSummary;

pub const DEFAULT_EXPERIENCE_LEVEL: &str = "Fresher";

/// Experience levels offered at sign-up.
pub const EXPERIENCE_LEVELS: [&str; 5] = ["Fresher", "Junior", "Mid-Level", "Senior", "Lead"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    /// # Errors
    ///
    /// Returns the per-field failures from [`validation::validate_login`].
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validation::validate_login(self)
    }
}

/// Sign-up form. `confirm_password` is checked locally and never sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing, default)]
    pub confirm_password: String,
    pub education: String,
    #[serde(default = "default_experience_level")]
    pub experience_level: String,
    pub preferred_track: String,
}

fn default_experience_level() -> String {
    DEFAULT_EXPERIENCE_LEVEL.to_owned()
}

impl Registration {
    /// # Errors
    ///
    /// Returns the per-field failures from [`validation::validate_registration`].
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validation::validate_registration(self)
    }
}

impl Default for Registration {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            education: String::new(),
            experience_level: default_experience_level(),
            preferred_track: String::new(),
        }
    }
}

/// Successful `/accounts/login/` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserSummary,
}
