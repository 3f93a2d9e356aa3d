//! Outbound collaborators: recommendation, review and job search.
//!
//! Every client makes a single attempt bounded by the configured timeout.
//! Failures never leave a client: they are logged and replaced by a fixed
//! fallback value tagged `Outcome::Fallback`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::document::UploadedDocument;
use crate::models::pipeline::{JobListing, RecommendedPosition, ReviewResult};

pub mod job_search;
pub mod recommendation;
pub mod review;

/// Multipart field carrying the resume in every outbound upload.
pub const DOCUMENT_FIELD: &str = "file";
const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a failure-absorbing call: real data or the substituted fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Live(T),
    Fallback(T),
}

impl<T> Outcome<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Outcome::Live(value) | Outcome::Fallback(value) => value,
        }
    }
}

#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(&self, document: &UploadedDocument) -> Outcome<Vec<RecommendedPosition>>;
}

#[async_trait]
pub trait Reviewer: Send + Sync {
    async fn review(&self, document: &UploadedDocument) -> Outcome<ReviewResult>;
}

#[async_trait]
pub trait JobSearcher: Send + Sync {
    async fn search(&self, title: &str) -> Outcome<Vec<JobListing>>;
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client, ServiceError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Reads the stored document back and wraps it as a multipart form.
pub(crate) async fn document_form(document: &UploadedDocument) -> Result<Form, ServiceError> {
    let bytes = tokio::fs::read(&document.stored_path).await?;
    let part = Part::bytes(bytes)
        .file_name(document.original_filename.clone())
        .mime_str(PDF_MIME)?;
    Ok(Form::new().part(DOCUMENT_FIELD, part))
}

/// Rejects non-2xx statuses and deserializes the body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ServiceError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}
