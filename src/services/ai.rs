//! AI career features. All inference runs on the backend; these calls only
//! move requests and results.
//!
//! Response shapes are loosely specified by the backend, so every type keeps
//! unknown fields in `extra` and defaults anything missing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::jobs::JobId;
use crate::auth::ValidationErrors;
use crate::error::ApiError;
use crate::net::{FormPart, HttpClient, Method};

pub const RECOMMENDATION_PATH: &str = "/ai/job/recommendation/";
pub const GAP_ANALYSIS_PATH: &str = "/ai/gap-analysis-and-learning-suggestions/";
pub const ROADMAP_PATH: &str = "/ai/roadmap/generator/";
pub const CHAT_PATH: &str = "/ai/chat/";
pub const EXTRACT_SKILLS_PATH: &str = "/extract-skills/";

const NO_ANSWER: &str = "I couldn't come up with an answer to that. Try rephrasing the question.";

// =============================================================================
// RECOMMENDATIONS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub recommended_jobs: Vec<RecommendedJob>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JobId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_percentage: Option<f64>,
    #[serde(default)]
    pub matched_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// GAP ANALYSIS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    #[serde(default)]
    pub missing_skills: Vec<SkillGap>,
    #[serde(default)]
    pub learning_suggestions: Vec<String>,
    /// Percentage of target skills already covered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GapAnalysis {
    /// Learning resources across every gap.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.missing_skills.iter().map(|gap| gap.learning_resources.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill: String,
    /// `high`, `medium`, or `low`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub related_jobs: Vec<Value>,
    #[serde(default)]
    pub learning_resources: Vec<Resource>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// ROADMAP
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_progress: Option<f64>,
    #[serde(default)]
    pub phases: Vec<RoadmapPhase>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Roadmap {
    /// Phases whose status reads `completed`.
    #[must_use]
    pub fn completed_phases(&self) -> usize {
        self.phases
            .iter()
            .filter(|phase| phase.status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("completed")))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapPhase {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub skills_to_learn: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

// =============================================================================
// CHAT + SKILL EXTRACTION
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatAnswer {
    #[must_use]
    pub fn new(answer: impl Into<String>) -> Self {
        Self { answer: Some(answer.into()), ..Self::default() }
    }

    /// Text to show: `answer`, else `message`, else a generic apology.
    #[must_use]
    pub fn text(&self) -> &str {
        [self.answer.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .unwrap_or(NO_ANSWER)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSkills {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Input for skill extraction: pasted text or an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillSource {
    Text(String),
    File { file_name: String, bytes: Vec<u8> },
}

impl SkillSource {
    fn into_part(self) -> FormPart {
        match self {
            Self::Text(text) => FormPart::text("text", text),
            Self::File { file_name, bytes } => {
                let mime = mime_for(&file_name).to_owned();
                FormPart::File { name: "file".to_owned(), file_name, mime, bytes }
            }
        }
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".pdf") {
        "application/pdf"
    } else if lower.ends_with(".docx") {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    } else if lower.ends_with(".txt") {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}

// =============================================================================
// CALLS
// =============================================================================

/// # Errors
///
/// Propagates client errors.
pub async fn job_recommendations(client: &HttpClient) -> Result<Recommendations, ApiError> {
    client.get(RECOMMENDATION_PATH).await
}

/// # Errors
///
/// Propagates client errors.
pub async fn gap_analysis(client: &HttpClient) -> Result<GapAnalysis, ApiError> {
    client.get(GAP_ANALYSIS_PATH).await
}

/// # Errors
///
/// Propagates client errors.
pub async fn roadmap(client: &HttpClient) -> Result<Roadmap, ApiError> {
    client.get(ROADMAP_PATH).await
}

/// # Errors
///
/// [`ApiError::Validation`] for a blank question, otherwise client errors.
pub async fn ask_career_bot(client: &HttpClient, question: &str) -> Result<ChatAnswer, ApiError> {
    if question.trim().is_empty() {
        let mut errors = ValidationErrors::new();
        errors.add("question", "Question is required");
        return Err(ApiError::Validation(errors));
    }
    client.post(CHAT_PATH, &json!({ "question": question })).await
}

/// # Errors
///
/// [`ApiError::Validation`] for empty input, otherwise client errors.
pub async fn extract_skills(client: &HttpClient, source: SkillSource) -> Result<ExtractedSkills, ApiError> {
    let empty = match &source {
        SkillSource::Text(text) => text.trim().is_empty(),
        SkillSource::File { bytes, .. } => bytes.is_empty(),
    };
    if empty {
        let mut errors = ValidationErrors::new();
        errors.add("source", "Provide resume text or a file");
        return Err(ApiError::Validation(errors));
    }
    client
        .send_multipart(Method::Post, EXTRACT_SKILLS_PATH, vec![source.into_part()])
        .await
}

#[cfg(test)]
#[path = "ai_test.rs"]
mod tests;
