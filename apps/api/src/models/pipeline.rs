use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A job title suggested by the classification service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedPosition {
    pub title: String,
    /// 0 – 100 when present. Absent scores are defaulted by the pipeline.
    pub similarity_score: Option<f64>,
}

impl RecommendedPosition {
    pub fn unscored(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            similarity_score: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReviewResult {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// A single listing from the job search provider, passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobListing(pub Value);

/// Listings found for one recommended position. Index-aligned with the
/// recommendation it was derived from.
#[derive(Debug, Clone, Serialize)]
pub struct JobMatch {
    pub job: String,
    pub percent: f64,
    pub listings: Vec<JobListing>,
}

/// Collaborators that answered with their fallback value during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedService {
    Recommendation,
    Review,
    JobSearch,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Stored file name (timestamp-prefixed).
    pub filename: String,
    pub original_filename: String,
    pub stored_path: String,
    pub size_bytes: u64,
    pub extracted_text: String,
    pub recommendations: Vec<RecommendedPosition>,
    pub review: ReviewResult,
    pub matches: Vec<JobMatch>,
    pub degraded: Vec<DegradedService>,
}
