//! Text Extractor: best-effort plain text from a stored PDF.
//!
//! Never fails. Empty and unreadable documents come back as typed variants
//! that render to sentinel strings.

use std::path::Path;

use tracing::{debug, warn};

pub const EMPTY_DOCUMENT_TEXT: &str = "[empty document]";

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Text(String),
    Empty,
    Failed(String),
}

impl Extraction {
    pub fn into_text(self) -> String {
        match self {
            Extraction::Text(text) => text,
            Extraction::Empty => EMPTY_DOCUMENT_TEXT.to_string(),
            Extraction::Failed(reason) => format!("[text extraction failed: {reason}]"),
        }
    }
}

pub async fn extract_text(path: &Path) -> Extraction {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Could not read {} for extraction: {e}", path.display());
            return Extraction::Failed(e.to_string());
        }
    };

    if bytes.is_empty() {
        return Extraction::Empty;
    }

    // pdf-extract is CPU-bound and may panic on malformed input.
    let parsed =
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;

    match parsed {
        Ok(Ok(text)) => {
            debug!("Extracted {} chars from {}", text.len(), path.display());
            Extraction::Text(text)
        }
        Ok(Err(e)) => {
            warn!("PDF parse failed for {}: {e}", path.display());
            Extraction::Failed(e.to_string())
        }
        Err(e) => {
            warn!("PDF parser aborted on {}: {e}", path.display());
            Extraction::Failed("parser aborted".to_string())
        }
    }
}
