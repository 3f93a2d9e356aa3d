use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{http_client, read_json, JobSearcher, Outcome, ServiceError};
use crate::config::JobSearchConfig;
use crate::models::pipeline::JobListing;

const ENGINE: &str = "google_jobs";

/// `jobs_results` may be absent or `null` when a query yields nothing.
#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    jobs_results: Option<Vec<JobListing>>,
    /// Set by the provider when a query yields nothing. Usually a string.
    #[serde(default)]
    error: Option<Value>,
}

/// SerpAPI Google Jobs client scoped to one fixed locale.
pub struct JobSearchClient {
    client: Client,
    config: JobSearchConfig,
}

impl JobSearchClient {
    pub fn new(config: JobSearchConfig, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            client: http_client(timeout)?,
            config,
        })
    }

    async fn fetch(&self, title: &str) -> Result<Vec<JobListing>, ServiceError> {
        let response = self
            .client
            .get(&self.config.url)
            .query(&[
                ("engine", ENGINE),
                ("api_key", self.config.api_key.as_str()),
                ("q", title),
                ("hl", self.config.language.as_str()),
                ("location", self.config.location.as_str()),
                ("google_domain", self.config.google_domain.as_str()),
                ("gl", self.config.country.as_str()),
            ])
            .send()
            .await?;

        let payload: SearchPayload = read_json(response).await?;
        let listings = payload.jobs_results.unwrap_or_default();
        if let Some(reason) = payload.error.filter(|_| listings.is_empty()) {
            debug!("No listings for '{title}': {reason}");
        }
        Ok(listings)
    }
}

#[async_trait]
impl JobSearcher for JobSearchClient {
    async fn search(&self, title: &str) -> Outcome<Vec<JobListing>> {
        match self.fetch(title).await {
            Ok(listings) => {
                debug!("Job search for '{title}' returned {} listings", listings.len());
                Outcome::Live(listings)
            }
            Err(e) => {
                warn!("Job search for '{title}' failed, returning no listings: {e}");
                Outcome::Fallback(Vec::new())
            }
        }
    }
}
