//! Bundled sample content for AI screens when the backend is unreachable.
//!
//! Substitution is opt-in per call through [`FallbackPolicy`]; the service
//! functions themselves always report failures. Only "backend unavailable"
//! failures (network, timeout, 5xx) are replaced. A 4xx or an expired session
//! is still the caller's to handle.

use serde::Serialize;

use super::ai::{
    ChatAnswer, GapAnalysis, Milestone, Recommendations, RecommendedJob, Resource, Roadmap, RoadmapPhase, SkillGap,
};
use super::jobs::JobId;
use crate::error::{ApiError, ErrorCode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Return the error as-is.
    #[default]
    Surface,
    /// Replace an unavailable-backend error with sample content.
    UseSample,
}

/// A value tagged with where it came from.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Sourced<T> {
    Live { data: T },
    Sample {
        data: T,
        #[serde(serialize_with = "serialize_error")]
        error: ApiError,
    },
}

fn serialize_error<S: serde::Serializer>(error: &ApiError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

impl<T> Sourced<T> {
    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            Self::Live { data } | Self::Sample { data, .. } => data,
        }
    }

    #[must_use]
    pub fn into_value(self) -> T {
        match self {
            Self::Live { data } | Self::Sample { data, .. } => data,
        }
    }

    #[must_use]
    pub fn is_sample(&self) -> bool {
        matches!(self, Self::Sample { .. })
    }

    /// The failure that was papered over, for sample values.
    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Live { .. } => None,
            Self::Sample { error, .. } => Some(error),
        }
    }
}

/// Apply `policy` to a service result.
///
/// # Errors
///
/// Returns the original error unless the policy allows a sample and the
/// error means the backend was unavailable.
pub fn resolve<T>(
    result: Result<T, ApiError>,
    policy: FallbackPolicy,
    sample: impl FnOnce() -> T,
) -> Result<Sourced<T>, ApiError> {
    match result {
        Ok(data) => Ok(Sourced::Live { data }),
        Err(error) if policy == FallbackPolicy::UseSample && error.is_unavailable() => {
            tracing::warn!(error = %error, code = error.error_code(), "backend unavailable; showing sample content");
            Ok(Sourced::Sample { data: sample(), error })
        }
        Err(error) => Err(error),
    }
}

// =============================================================================
// SAMPLES
// =============================================================================

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn resource(title: &str, platform: &str, difficulty: &str, duration: &str) -> Resource {
    Resource {
        title: title.to_owned(),
        platform: Some(platform.to_owned()),
        url: None,
        difficulty: Some(difficulty.to_owned()),
        duration: Some(duration.to_owned()),
        extra: serde_json::Map::new(),
    }
}

#[must_use]
pub fn sample_recommendations() -> Recommendations {
    let job = |id: &str, title: &str, company: &str, location: &str, score: f64, matched: &[&str], missing: &[&str]| {
        RecommendedJob {
            id: Some(JobId::Text(id.to_owned())),
            title: title.to_owned(),
            company: company.to_owned(),
            location: Some(location.to_owned()),
            match_percentage: Some(score),
            matched_skills: strings(matched),
            missing_skills: strings(missing),
            extra: serde_json::Map::new(),
        }
    };
    Recommendations {
        recommended_jobs: vec![
            job(
                "sample-1",
                "Frontend Developer",
                "Brightline Labs",
                "Remote",
                84.0,
                &["React", "JavaScript", "CSS"],
                &["TypeScript", "Testing Library"],
            ),
            job(
                "sample-2",
                "Backend Developer",
                "Northwind Systems",
                "Dhaka",
                71.0,
                &["Python", "SQL", "REST APIs"],
                &["Docker", "PostgreSQL"],
            ),
        ],
        missing_skills: strings(&["Docker", "TypeScript", "PostgreSQL"]),
        extra: serde_json::Map::new(),
    }
}

#[must_use]
pub fn sample_gap_analysis() -> GapAnalysis {
    let gap = |skill: &str, priority: &str, reason: &str, resources: Vec<Resource>| SkillGap {
        skill: skill.to_owned(),
        priority: Some(priority.to_owned()),
        reason: Some(reason.to_owned()),
        related_jobs: Vec::new(),
        learning_resources: resources,
        extra: serde_json::Map::new(),
    };
    GapAnalysis {
        missing_skills: vec![
            gap(
                "Docker",
                "high",
                "Most backend postings expect containerized deployments.",
                vec![resource("Containers from Scratch", "YouTube", "Beginner", "3 hours")],
            ),
            gap(
                "TypeScript",
                "medium",
                "Frontend roles increasingly list typed JavaScript.",
                vec![resource("TypeScript Handbook", "Official docs", "Intermediate", "1 week")],
            ),
        ],
        learning_suggestions: strings(&[
            "Ship one small project that uses each missing skill end to end.",
            "Pair every course with notes you can turn into a portfolio write-up.",
        ]),
        skills_score: Some(62.0),
        extra: serde_json::Map::new(),
    }
}

#[must_use]
pub fn sample_roadmap() -> Roadmap {
    let milestone = |title: &str| Milestone { title: title.to_owned(), description: None, completed: false };
    let phase = |title: &str, duration: &str, skills: &[&str], milestones: Vec<Milestone>| RoadmapPhase {
        title: title.to_owned(),
        description: None,
        duration: Some(duration.to_owned()),
        status: Some("upcoming".to_owned()),
        skills_to_learn: strings(skills),
        milestones,
        resources: Vec::new(),
        extra: serde_json::Map::new(),
    };
    Roadmap {
        goal: Some("Junior Full-Stack Developer".to_owned()),
        estimated_time: Some("6 months".to_owned()),
        overall_progress: Some(0.0),
        phases: vec![
            phase(
                "Foundations",
                "6 weeks",
                &["HTML", "CSS", "JavaScript"],
                vec![milestone("Build a static portfolio site")],
            ),
            phase(
                "Frameworks",
                "8 weeks",
                &["React", "Django"],
                vec![milestone("Connect a React front end to a REST API")],
            ),
            phase(
                "Production",
                "10 weeks",
                &["Docker", "SQL", "Testing"],
                vec![milestone("Deploy a tested app with a database")],
            ),
        ],
        tips: strings(&["Commit to a weekly schedule and keep it visible.", "Ask for code review early."]),
        extra: serde_json::Map::new(),
    }
}

/// Canned chat answer picked by keyword.
#[must_use]
pub fn sample_chat_answer(question: &str) -> ChatAnswer {
    let q = question.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| q.contains(w));
    let answer = if has(&["node", "express"]) {
        "Node.js reuses the JavaScript you already know on the server. Start with modern \
         JavaScript and async/await, then build a small Express REST API backed by a database."
    } else if has(&["react", "jsx", "component"]) {
        "For React, get comfortable with components, props, and state first. Then learn the \
         core hooks and build a few small apps before reaching for a state library."
    } else if has(&["python", "django", "flask"]) {
        "Python rewards steady practice: cover the language basics and classes, then pick \
         Django or Flask and build a CRUD app. Small automation scripts are good practice too."
    } else if has(&["career", "job", "advice"]) {
        "Keep a portfolio of finished projects, keep learning in small steps, and talk to \
         people already doing the job you want. Specializing over time helps you stand out."
    } else {
        "Break the topic into small pieces and practice each one with a tiny project. Share \
         your work to get feedback. Which area would you like to go deeper on?"
    };
    ChatAnswer::new(answer)
}

#[cfg(test)]
#[path = "fallback_test.rs"]
mod tests;
