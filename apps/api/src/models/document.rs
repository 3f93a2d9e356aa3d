use std::path::PathBuf;

use serde::Serialize;

/// A resume persisted by the document store. Owned by the pipeline run that
/// created it and never reused across requests.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedDocument {
    pub original_filename: String,
    /// File name under the upload directory: `<stamp>_<original_filename>`.
    pub storage_key: String,
    pub stored_path: PathBuf,
    pub size_bytes: u64,
    /// Lower-cased extension without the dot, e.g. `pdf`.
    pub mime_extension: String,
}
