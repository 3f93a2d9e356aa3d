use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_SERPAPI_URL: &str = "https://serpapi.com/search.json";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub recommendation_url: String,
    pub review_url: String,
    pub job_search: JobSearchConfig,
    /// Upper bound on every outbound call; elapsed calls count as transport failures.
    pub service_timeout: Duration,
    /// Score assigned to a match whose recommendation carried no usable similarity score.
    pub default_match_percent: f64,
    pub rust_log: String,
}

/// Provider endpoint plus the fixed locale every job search is scoped to.
#[derive(Debug, Clone)]
pub struct JobSearchConfig {
    pub url: String,
    pub api_key: String,
    pub location: String,
    pub language: String,
    pub country: String,
    pub google_domain: String,
    pub concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let service_timeout_secs = or_default("SERVICE_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .context("SERVICE_TIMEOUT_SECS must be a whole number of seconds")?;
        if service_timeout_secs == 0 {
            bail!("SERVICE_TIMEOUT_SECS must be at least 1");
        }

        let concurrency = or_default("JOB_SEARCH_CONCURRENCY", "8")
            .parse::<usize>()
            .context("JOB_SEARCH_CONCURRENCY must be a positive integer")?;
        if concurrency == 0 {
            bail!("JOB_SEARCH_CONCURRENCY must be at least 1");
        }

        let default_match_percent = or_default("DEFAULT_MATCH_PERCENT", "50")
            .parse::<f64>()
            .context("DEFAULT_MATCH_PERCENT must be a number")?;
        if !(10.0..=100.0).contains(&default_match_percent) {
            bail!(
                "DEFAULT_MATCH_PERCENT must lie between 10 and 100, got {default_match_percent}"
            );
        }

        Ok(Config {
            host: or_default("HOST", "0.0.0.0"),
            port: or_default("PORT", "5000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            upload_dir: PathBuf::from(or_default("UPLOAD_DIR", "uploads")),
            recommendation_url: require("RECOMMENDATION_SERVICE_URL")?,
            review_url: require("REVIEW_SERVICE_URL")?,
            job_search: JobSearchConfig {
                url: or_default("SERPAPI_URL", DEFAULT_SERPAPI_URL),
                api_key: require("SERPAPI_KEY")?,
                location: or_default("JOB_SEARCH_LOCATION", "Indonesia"),
                language: or_default("JOB_SEARCH_LANGUAGE", "id"),
                country: or_default("JOB_SEARCH_COUNTRY", "id"),
                google_domain: or_default("JOB_SEARCH_DOMAIN", "google.com"),
                concurrency,
            },
            service_timeout: Duration::from_secs(service_timeout_secs),
            default_match_percent,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }
}
