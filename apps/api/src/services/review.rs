use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use super::{document_form, http_client, read_json, Outcome, Reviewer, ServiceError};
use crate::models::document::UploadedDocument;
use crate::models::pipeline::ReviewResult;

pub const REVIEW_UNAVAILABLE: &str = "Review unavailable";

pub fn fallback_review() -> ReviewResult {
    ReviewResult {
        strengths: vec![REVIEW_UNAVAILABLE.to_string()],
        weaknesses: vec![REVIEW_UNAVAILABLE.to_string()],
        suggestions: vec![REVIEW_UNAVAILABLE.to_string()],
    }
}

#[derive(Debug, Deserialize)]
struct ReviewPayload {
    review: ReviewResult,
}

pub struct ReviewClient {
    client: Client,
    url: String,
}

impl ReviewClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.into(),
        })
    }

    async fn fetch(&self, document: &UploadedDocument) -> Result<ReviewResult, ServiceError> {
        let form = document_form(document).await?;

        info!("Calling review service: {}", self.url);
        let response = self.client.post(&self.url).multipart(form).send().await?;
        let payload: ReviewPayload = read_json(response).await?;

        Ok(payload.review)
    }
}

#[async_trait]
impl Reviewer for ReviewClient {
    async fn review(&self, document: &UploadedDocument) -> Outcome<ReviewResult> {
        match self.fetch(document).await {
            Ok(review) => Outcome::Live(review),
            Err(e) => {
                warn!("Review service unavailable, using fallback review: {e}");
                Outcome::Fallback(fallback_review())
            }
        }
    }
}
