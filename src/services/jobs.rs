//! Job listings: browse, search, filter, and the admin CRUD surface.
//!
//! Search and filter responses arrive wrapped in envelopes that differ per
//! endpoint; both are normalized here so callers always get the same shapes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::net::{HttpClient, path_segment, query_pairs};

pub const JOBS_PATH: &str = "/jobs/";
pub const SEARCH_PATH: &str = "/jobs/search/";
pub const FILTER_PATH: &str = "/filter/jobs/";
pub const ADMIN_JOBS_PATH: &str = "/admin/jobs/";

pub const DEFAULT_DRAFT_EXPERIENCE_LEVEL: &str = "Entry-level";
pub const DEFAULT_JOB_TYPE: &str = "Full-time";

/// Job identifiers are integers on some deployments and opaque strings on others.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Int(i64),
    Text(String),
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for JobId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        id.parse().map_or_else(|_| Self::Text(id.to_owned()), Self::Int)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `/jobs/` answers either with a bare array or a paginated page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum JobList {
    Page {
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<Job>,
    },
    Plain(Vec<Job>),
}

impl JobList {
    #[must_use]
    pub fn jobs(&self) -> &[Job] {
        match self {
            Self::Page { results, .. } => results,
            Self::Plain(jobs) => jobs,
        }
    }

    #[must_use]
    pub fn into_jobs(self) -> Vec<Job> {
        match self {
            Self::Page { results, .. } => results,
            Self::Plain(jobs) => jobs,
        }
    }

    /// `true` when the server reported a further page.
    #[must_use]
    pub fn has_next(&self) -> bool {
        matches!(self, Self::Page { next: Some(_), .. })
    }
}

/// Query parameters for `/jobs/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Facets accepted by `/filter/jobs/`. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
}

impl JobFilter {
    /// Copy with blank facets dropped.
    #[must_use]
    pub fn active(&self) -> Self {
        let keep = |facet: &Option<String>| {
            facet.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
        };
        Self { skill: keep(&self.skill), location: keep(&self.location), job_type: keep(&self.job_type) }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        let active = self.active();
        active.skill.is_none() && active.location.is_none() && active.job_type.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JobId>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default)]
    pub related_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub jobs: Vec<Job>,
    pub learning_resources: Vec<LearningResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterResults {
    pub jobs: Vec<Job>,
    pub applied_filters: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    results: Option<SearchBody>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchBody {
    #[serde(default)]
    jobs: Option<Vec<Job>>,
    #[serde(default)]
    learning_resources: Option<Vec<LearningResource>>,
}

#[derive(Debug, Default, Deserialize)]
struct FilterEnvelope {
    #[serde(default)]
    filters: Option<Map<String, Value>>,
    #[serde(default)]
    results: Option<Vec<Job>>,
}

/// Admin create/update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub company: String,
    pub location: String,
    pub required_skills: Vec<String>,
    pub experience_level: String,
    pub job_type: String,
}

impl Default for JobDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            company: String::new(),
            location: String::new(),
            required_skills: Vec::new(),
            experience_level: DEFAULT_DRAFT_EXPERIENCE_LEVEL.to_owned(),
            job_type: DEFAULT_JOB_TYPE.to_owned(),
        }
    }
}

/// Split a comma-separated skills field into trimmed, non-empty entries.
#[must_use]
pub fn parse_skills(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

// =============================================================================
// PUBLIC
// =============================================================================

/// # Errors
///
/// Propagates client errors.
pub async fn list(client: &HttpClient, query: &JobQuery) -> Result<JobList, ApiError> {
    client.get_with_query(JOBS_PATH, query_pairs(query)?).await
}

/// # Errors
///
/// [`ApiError::Validation`] for an id that cannot be a path segment, otherwise
/// client errors; an unknown id is an [`ApiError::Http`] 404.
pub async fn get(client: &HttpClient, id: &JobId) -> Result<Job, ApiError> {
    client.get(&job_path(JOBS_PATH, id)?).await
}

/// Free-text search returning matching jobs plus related learning resources.
///
/// # Errors
///
/// Propagates client errors.
pub async fn search(client: &HttpClient, term: &str) -> Result<SearchResults, ApiError> {
    let envelope: Option<SearchEnvelope> = client
        .get_with_query(SEARCH_PATH, vec![("q".to_owned(), term.to_owned())])
        .await?;
    let envelope = envelope.unwrap_or_default();
    let body = envelope.results.unwrap_or_default();
    let query = envelope
        .query
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| term.to_owned());
    Ok(SearchResults {
        query,
        jobs: body.jobs.unwrap_or_default(),
        learning_resources: body.learning_resources.unwrap_or_default(),
    })
}

/// Facet filter. Blank facets are not sent.
///
/// # Errors
///
/// Propagates client errors.
pub async fn filter(client: &HttpClient, facets: &JobFilter) -> Result<FilterResults, ApiError> {
    let envelope: Option<FilterEnvelope> = client.get_with_query(FILTER_PATH, query_pairs(&facets.active())?).await?;
    let envelope = envelope.unwrap_or_default();
    Ok(FilterResults {
        jobs: envelope.results.unwrap_or_default(),
        applied_filters: envelope.filters.unwrap_or_default(),
    })
}

// =============================================================================
// ADMIN
// =============================================================================

/// # Errors
///
/// Propagates client errors.
pub async fn admin_list(client: &HttpClient) -> Result<JobList, ApiError> {
    client.get(ADMIN_JOBS_PATH).await
}

/// # Errors
///
/// Propagates client errors.
pub async fn admin_create(client: &HttpClient, draft: &JobDraft) -> Result<Job, ApiError> {
    client.post(ADMIN_JOBS_PATH, draft).await
}

/// Full replacement.
///
/// # Errors
///
/// Propagates client errors.
pub async fn admin_update(client: &HttpClient, id: &JobId, draft: &JobDraft) -> Result<Job, ApiError> {
    client.put(&job_path(ADMIN_JOBS_PATH, id)?, draft).await
}

/// Partial update with only the fields in `changes`.
///
/// # Errors
///
/// Propagates client errors.
pub async fn admin_patch(client: &HttpClient, id: &JobId, changes: &Value) -> Result<Job, ApiError> {
    client.patch(&job_path(ADMIN_JOBS_PATH, id)?, changes).await
}

/// # Errors
///
/// Propagates client errors.
pub async fn admin_delete(client: &HttpClient, id: &JobId) -> Result<(), ApiError> {
    let _gone: Value = client.delete(&job_path(ADMIN_JOBS_PATH, id)?).await?;
    Ok(())
}

fn job_path(base: &str, id: &JobId) -> Result<String, ApiError> {
    match id {
        JobId::Int(id) => Ok(format!("{base}{id}/")),
        JobId::Text(id) => Ok(format!("{base}{}/", path_segment("id", id)?)),
    }
}

#[cfg(test)]
#[path = "jobs_test.rs"]
mod tests;
