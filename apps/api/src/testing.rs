//! Stand-ins for the external collaborators, shared by unit tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use serde_json::json;

use crate::models::document::UploadedDocument;
use crate::models::pipeline::{JobListing, RecommendedPosition, ReviewResult};
use crate::services::{JobSearcher, Outcome, Recommender, Reviewer};

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A URL on a port that was free a moment ago, so connections are refused.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/unreachable")
}

pub async fn sample_document(dir: &Path, name: &str, bytes: &[u8]) -> UploadedDocument {
    let stored_path = dir.join(format!("1700000000000_{name}"));
    tokio::fs::write(&stored_path, bytes).await.unwrap();
    UploadedDocument {
        original_filename: name.to_string(),
        storage_key: format!("1700000000000_{name}"),
        stored_path,
        size_bytes: bytes.len() as u64,
        mime_extension: "pdf".to_string(),
    }
}

pub fn listings(count: usize) -> Vec<JobListing> {
    (0..count)
        .map(|i| {
            JobListing(json!({
                "title": format!("Engineer {i}"),
                "company_name": format!("Company {i}"),
                "location": "Jakarta"
            }))
        })
        .collect()
}

pub struct StubRecommender(Outcome<Vec<RecommendedPosition>>);

impl StubRecommender {
    pub fn new(outcome: Outcome<Vec<RecommendedPosition>>) -> Self {
        Self(outcome)
    }
}

#[async_trait]
impl Recommender for StubRecommender {
    async fn recommend(&self, _document: &UploadedDocument) -> Outcome<Vec<RecommendedPosition>> {
        self.0.clone()
    }
}

pub struct StubReviewer(Outcome<ReviewResult>);

impl StubReviewer {
    pub fn new(outcome: Outcome<ReviewResult>) -> Self {
        Self(outcome)
    }
}

#[async_trait]
impl Reviewer for StubReviewer {
    async fn review(&self, _document: &UploadedDocument) -> Outcome<ReviewResult> {
        self.0.clone()
    }
}

/// Answers per title; unknown titles get no listings. Records every query
/// and the highest number of searches seen in flight at once.
#[derive(Default)]
pub struct StubJobSearcher {
    results: HashMap<String, Outcome<Vec<JobListing>>>,
    delays: HashMap<String, Duration>,
    calls: Arc<Mutex<Vec<String>>>,
    in_flight: AtomicUsize,
    peak: Arc<AtomicUsize>,
}

impl StubJobSearcher {
    pub fn with(mut self, title: &str, outcome: Outcome<Vec<JobListing>>) -> Self {
        self.results.insert(title.to_string(), outcome);
        self
    }

    pub fn delayed(mut self, title: &str, delay: Duration) -> Self {
        self.delays.insert(title.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    pub fn peak_in_flight(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.peak)
    }
}

#[async_trait]
impl JobSearcher for StubJobSearcher {
    async fn search(&self, title: &str) -> Outcome<Vec<JobListing>> {
        self.calls.lock().unwrap().push(title.to_string());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(title) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.results
            .get(title)
            .cloned()
            .unwrap_or(Outcome::Live(Vec::new()))
    }
}
