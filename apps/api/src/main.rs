mod config;
mod errors;
mod extraction;
mod models;
mod pipeline;
mod routes;
mod services;
mod state;
mod storage;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV match API v{}", env!("CARGO_PKG_VERSION"));

    let pipeline = Pipeline::from_config(&config)?;
    info!(
        "Upload pipeline ready (uploads: {}, recommendation: {}, review: {}, timeout: {:?})",
        pipeline.store().root().display(),
        config.recommendation_url,
        config.review_url,
        config.service_timeout
    );
    info!(
        "Job search scoped to {} (hl={}, gl={}), up to {} concurrent searches",
        config.job_search.location,
        config.job_search.language,
        config.job_search.country,
        config.job_search.concurrency
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
