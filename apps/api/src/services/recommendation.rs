use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{document_form, http_client, read_json, Outcome, Recommender, ServiceError};
use crate::models::document::UploadedDocument;
use crate::models::pipeline::RecommendedPosition;

/// Titles returned, unscored, whenever the classification service cannot answer.
pub const FALLBACK_TITLES: [&str; 3] = ["back end", "front end", "designer"];

pub fn fallback_positions() -> Vec<RecommendedPosition> {
    FALLBACK_TITLES
        .iter()
        .map(|title| RecommendedPosition::unscored(*title))
        .collect()
}

/// The service answers either with a bare array or with the array wrapped
/// under `recommendations`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecommendationPayload {
    Bare(Vec<WireRecommendation>),
    Wrapped { recommendations: Vec<WireRecommendation> },
}

#[derive(Debug, Deserialize)]
struct WireRecommendation {
    recommended_job_title: String,
    #[serde(default)]
    similarity_score: Option<Value>,
}

impl RecommendationPayload {
    fn into_positions(self) -> Vec<RecommendedPosition> {
        let items = match self {
            RecommendationPayload::Bare(items) => items,
            RecommendationPayload::Wrapped { recommendations } => recommendations,
        };
        items
            .into_iter()
            .map(|item| RecommendedPosition {
                similarity_score: item.similarity_score.as_ref().and_then(normalize_score),
                title: item.recommended_job_title,
            })
            .collect()
    }
}

/// Numbers and numeric strings are accepted and clamped to 0 – 100.
fn normalize_score(raw: &Value) -> Option<f64> {
    let score = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    score.is_finite().then(|| score.clamp(0.0, 100.0))
}

pub struct RecommendationClient {
    client: Client,
    url: String,
}

impl RecommendationClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.into(),
        })
    }

    async fn fetch(
        &self,
        document: &UploadedDocument,
    ) -> Result<Vec<RecommendedPosition>, ServiceError> {
        let form = document_form(document).await?;

        info!("Calling recommendation service: {}", self.url);
        let response = self.client.post(&self.url).multipart(form).send().await?;
        let payload: RecommendationPayload = read_json(response).await?;

        Ok(payload.into_positions())
    }
}

#[async_trait]
impl Recommender for RecommendationClient {
    async fn recommend(&self, document: &UploadedDocument) -> Outcome<Vec<RecommendedPosition>> {
        match self.fetch(document).await {
            Ok(positions) => Outcome::Live(positions),
            Err(e) => {
                warn!("Recommendation service unavailable, using fallback titles: {e}");
                Outcome::Fallback(fallback_positions())
            }
        }
    }
}
