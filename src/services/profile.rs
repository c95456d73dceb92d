//! The signed-in user's profile and CV.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::auth::ValidationErrors;
use crate::error::ApiError;
use crate::net::{FormPart, HttpClient, Method};

pub const PROFILE_PATH: &str = "/profiles/profile/";
pub const AI_SUGGESTIONS_PATH: &str = "/profiles/ai-suggestions/";
pub const ANALYZE_CV_PATH: &str = "/profiles/analyze-cv/";

/// Multipart field the backend reads the CV from.
pub const CV_FIELD: &str = "cv_pdf";
pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_track: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    /// URL of the stored CV, `None` when no CV is on file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_pdf: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    #[must_use]
    pub fn has_cv(&self) -> bool {
        self.cv_pdf.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// A PDF ready to be sent as the `cv_pdf` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl CvUpload {
    /// # Errors
    ///
    /// [`ApiError::Validation`] unless `file_name` ends in `.pdf` and `bytes`
    /// is non-empty.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ApiError> {
        let file_name = file_name.into();
        let mut errors = ValidationErrors::new();
        if !file_name.to_lowercase().ends_with(".pdf") {
            errors.add(CV_FIELD, "CV must be a PDF file");
        } else if bytes.is_empty() {
            errors.add(CV_FIELD, "CV file is empty");
        }
        errors.into_result().map_err(ApiError::Validation)?;
        Ok(Self { file_name, bytes })
    }

    /// Read a CV from disk.
    ///
    /// # Errors
    ///
    /// [`ApiError::Storage`] if the file cannot be read, otherwise as [`CvUpload::new`].
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Storage(format!("read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(file_name, bytes)
    }

    fn into_part(self) -> FormPart {
        FormPart::File {
            name: CV_FIELD.to_owned(),
            file_name: self.file_name,
            mime: PDF_MIME.to_owned(),
            bytes: self.bytes,
        }
    }
}

/// # Errors
///
/// Propagates client errors.
pub async fn get(client: &HttpClient) -> Result<Profile, ApiError> {
    client.get(PROFILE_PATH).await
}

/// Full update without a file.
///
/// # Errors
///
/// Propagates client errors.
pub async fn update(client: &HttpClient, profile: &Profile) -> Result<Profile, ApiError> {
    client.put(PROFILE_PATH, profile).await
}

/// Partial update with only the fields in `changes`.
///
/// # Errors
///
/// Propagates client errors.
pub async fn patch(client: &HttpClient, changes: &Value) -> Result<Profile, ApiError> {
    client.patch(PROFILE_PATH, changes).await
}

/// Full update sent as `multipart/form-data` together with a new CV.
///
/// `null` fields are left out; non-string values are sent as JSON text.
///
/// # Errors
///
/// Propagates client errors.
pub async fn update_with_cv(
    client: &HttpClient,
    fields: &Map<String, Value>,
    cv: CvUpload,
) -> Result<Profile, ApiError> {
    let mut parts: Vec<FormPart> = fields
        .iter()
        .filter_map(|(name, value)| match value {
            Value::Null => None,
            Value::String(text) => Some(FormPart::text(name, text.clone())),
            other => Some(FormPart::text(name, other.to_string())),
        })
        .collect();
    parts.push(cv.into_part());
    client.send_multipart(Method::Put, PROFILE_PATH, parts).await
}

/// Replace only the CV.
///
/// # Errors
///
/// Propagates client errors.
pub async fn upload_cv(client: &HttpClient, cv: CvUpload) -> Result<Profile, ApiError> {
    tracing::debug!(file = %cv.file_name, bytes = cv.bytes.len(), "uploading CV");
    client.send_multipart(Method::Patch, PROFILE_PATH, vec![cv.into_part()]).await
}

/// # Errors
///
/// Propagates client errors.
pub async fn delete_cv(client: &HttpClient) -> Result<Profile, ApiError> {
    client.patch(PROFILE_PATH, &json!({ CV_FIELD: null })).await
}

/// Server-generated profile improvement hints, where the backend offers them.
///
/// # Errors
///
/// Propagates client errors; a backend without the feature answers 404.
pub async fn ai_suggestions(client: &HttpClient) -> Result<Value, ApiError> {
    client.get(AI_SUGGESTIONS_PATH).await
}

/// Ask the backend to analyze the stored CV.
///
/// # Errors
///
/// Propagates client errors; a backend without the feature answers 404.
pub async fn analyze_cv(client: &HttpClient) -> Result<Value, ApiError> {
    client.post(ANALYZE_CV_PATH, &json!({})).await
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
