//! Upload pipeline: store, enrich, fan out, assemble.
//!
//! Flow: store → (extract ∥ recommend ∥ review) → job search fan-out → assemble.
//!
//! Only `Validation` and `Storage` errors escape `run`. Every downstream
//! collaborator absorbs its own failures, so once the document is stored the
//! caller always gets a complete result.

pub mod scoring;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::extraction::extract_text;
use crate::models::pipeline::{DegradedService, JobMatch, PipelineResult, RecommendedPosition};
use crate::services::job_search::JobSearchClient;
use crate::services::recommendation::RecommendationClient;
use crate::services::review::ReviewClient;
use crate::services::{JobSearcher, Recommender, Reviewer};
use crate::storage::DocumentStore;

use self::scoring::ScoringPolicy;

/// The outbound services a pipeline talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub recommender: Arc<dyn Recommender>,
    pub reviewer: Arc<dyn Reviewer>,
    pub job_search: Arc<dyn JobSearcher>,
}

pub struct Pipeline {
    store: DocumentStore,
    collaborators: Collaborators,
    scoring: ScoringPolicy,
    /// Bounds how many job searches are in flight at once.
    fan_out_limit: Arc<Semaphore>,
}

impl Pipeline {
    pub fn new(
        store: DocumentStore,
        collaborators: Collaborators,
        scoring: ScoringPolicy,
        max_concurrent_searches: usize,
    ) -> Self {
        Self {
            store,
            collaborators,
            scoring,
            fan_out_limit: Arc::new(Semaphore::new(max_concurrent_searches.max(1))),
        }
    }

    /// Wires the HTTP-backed collaborators from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let recommender =
            RecommendationClient::new(&config.recommendation_url, config.service_timeout)
                .context("Failed to build recommendation client")?;
        let reviewer = ReviewClient::new(&config.review_url, config.service_timeout)
            .context("Failed to build review client")?;
        let job_search = JobSearchClient::new(config.job_search.clone(), config.service_timeout)
            .context("Failed to build job search client")?;

        Ok(Self::new(
            DocumentStore::new(&config.upload_dir),
            Collaborators {
                recommender: Arc::new(recommender),
                reviewer: Arc::new(reviewer),
                job_search: Arc::new(job_search),
            },
            ScoringPolicy::uniform(config.default_match_percent)?,
            config.job_search.concurrency,
        ))
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub async fn run(
        &self,
        bytes: &[u8],
        original_filename: &str,
    ) -> Result<PipelineResult, AppError> {
        let document = self.store.store(bytes, original_filename).await?;

        let (extraction, recommendations, review) = tokio::join!(
            extract_text(&document.stored_path),
            self.collaborators.recommender.recommend(&document),
            self.collaborators.reviewer.review(&document),
        );

        let mut degraded = Vec::new();
        if recommendations.is_fallback() {
            degraded.push(DegradedService::Recommendation);
        }
        if review.is_fallback() {
            degraded.push(DegradedService::Review);
        }

        let recommendations = recommendations.into_inner();
        let (matches, search_degraded) = self.search_all(&recommendations).await;
        if search_degraded {
            degraded.push(DegradedService::JobSearch);
        }

        info!(
            "Pipeline finished for {}: {} matches, degraded={:?}",
            document.storage_key,
            matches.len(),
            degraded
        );

        Ok(PipelineResult {
            filename: document.storage_key,
            original_filename: document.original_filename,
            stored_path: document.stored_path.display().to_string(),
            size_bytes: document.size_bytes,
            extracted_text: extraction.into_text(),
            recommendations,
            review: review.into_inner(),
            matches,
            degraded,
        })
    }

    /// One task per position, joined in input order. Returns the matches and
    /// whether any branch fell back.
    async fn search_all(&self, positions: &[RecommendedPosition]) -> (Vec<JobMatch>, bool) {
        let handles: Vec<_> = positions
            .iter()
            .map(|position| {
                let searcher = Arc::clone(&self.collaborators.job_search);
                let limit = Arc::clone(&self.fan_out_limit);
                let title = position.title.clone();
                tokio::spawn(async move {
                    let _permit = limit.acquire_owned().await.ok();
                    searcher.search(&title).await
                })
            })
            .collect();

        let mut matches = Vec::with_capacity(positions.len());
        let mut degraded = false;

        for (position, handle) in positions.iter().zip(handles) {
            let listings = match handle.await {
                Ok(outcome) => {
                    degraded |= outcome.is_fallback();
                    outcome.into_inner()
                }
                Err(e) => {
                    warn!("Job search task for '{}' aborted: {e}", position.title);
                    degraded = true;
                    Vec::new()
                }
            };

            matches.push(JobMatch {
                job: position.title.clone(),
                percent: self.scoring.percent_for(position),
                listings,
            });
        }

        (matches, degraded)
    }
}
