use std::sync::Arc;

use crate::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Upload pipeline with its store and outbound clients already wired.
    pub pipeline: Arc<Pipeline>,
}
