//! Document Store: durable, collision-free persistence of uploaded resumes.
//!
//! Keys are `<stamp>_<name>` where `<stamp>` is a strictly increasing
//! millisecond timestamp, and files are opened create-new, so two uploads
//! sharing a name can never overwrite each other.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::document::UploadedDocument;

pub const ALLOWED_EXTENSION: &str = "pdf";
pub const FILE_MISSING_MESSAGE: &str = "File not found";
pub const ONLY_PDF_MESSAGE: &str = "Only PDF files are allowed";
pub const INVALID_FILENAME_MESSAGE: &str = "File name contains invalid characters";

const MAX_KEY_ATTEMPTS: u32 = 5;
/// Leaves room for the `<stamp>_` prefix under the usual 255-byte name limit.
const MAX_NAME_BYTES: usize = 200;

pub struct DocumentStore {
    root: PathBuf,
    last_stamp: AtomicI64,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            last_stamp: AtomicI64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates the filename and writes the full byte stream before returning.
    ///
    /// Fails with `Validation` for a missing name, control characters in the
    /// name or a non-PDF extension, and with `Storage` when the directory or
    /// file cannot be written. Overlong names are shortened, keeping `.pdf`.
    pub async fn store(
        &self,
        bytes: &[u8],
        original_filename: &str,
    ) -> Result<UploadedDocument, AppError> {
        let original_filename = sanitize_filename(original_filename)?;
        let mime_extension = pdf_extension(&original_filename)
            .ok_or_else(|| AppError::Validation(ONLY_PDF_MESSAGE.to_string()))?;
        let original_filename = shorten_filename(original_filename);

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Storage(format!(
                "cannot create upload directory {}: {e}",
                self.root.display()
            ))
        })?;

        let (storage_key, stored_path) = self.write_new(bytes, &original_filename).await?;

        info!(
            "Stored {} ({} bytes) as {}",
            original_filename,
            bytes.len(),
            stored_path.display()
        );

        Ok(UploadedDocument {
            original_filename,
            storage_key,
            stored_path,
            size_bytes: bytes.len() as u64,
            mime_extension,
        })
    }

    async fn write_new(&self, bytes: &[u8], name: &str) -> Result<(String, PathBuf), AppError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let key = format!("{}_{}", self.next_stamp(), name);
            let path = self.root.join(&key);

            match write_file(&path, bytes).await {
                Ok(()) => return Ok((key, path)),
                Err(e)
                    if e.kind() == io::ErrorKind::AlreadyExists && attempt < MAX_KEY_ATTEMPTS =>
                {
                    debug!("Storage key {key} already taken, drawing a new stamp");
                }
                Err(e) => {
                    if e.kind() != io::ErrorKind::AlreadyExists {
                        tokio::fs::remove_file(&path).await.ok();
                    }
                    return Err(AppError::Storage(format!(
                        "failed to write {}: {e}",
                        path.display()
                    )))
                }
            }
        }
    }

    /// Wall-clock milliseconds, bumped past the previous stamp when needed.
    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_stamp.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self
                .last_stamp
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }
}

/// The file handle lives only inside this function and is closed on every path.
async fn write_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;

    let written = file.metadata().await?.len();
    if written != bytes.len() as u64 {
        return Err(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("wrote {written} of {} bytes", bytes.len()),
        ));
    }
    Ok(())
}

/// Keeps only the final path component of a client-supplied name.
fn sanitize_filename(raw: &str) -> Result<String, AppError> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(AppError::Validation(FILE_MISSING_MESSAGE.to_string()));
    }
    if name.chars().any(char::is_control) {
        return Err(AppError::Validation(INVALID_FILENAME_MESSAGE.to_string()));
    }
    Ok(name.to_string())
}

/// Cuts the stem on a char boundary so the name fits in `MAX_NAME_BYTES`.
fn shorten_filename(name: String) -> String {
    if name.len() <= MAX_NAME_BYTES {
        return name;
    }
    let (stem, extension) = name.rsplit_once('.').unwrap_or((name.as_str(), ""));
    let mut end = MAX_NAME_BYTES.saturating_sub(extension.len() + 1).min(stem.len());
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}.{extension}", &stem[..end])
}

fn pdf_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| ext == ALLOWED_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_store_writes_full_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("uploads"));

        let doc = store.store(b"%PDF-1.4 resume", "cv.pdf").await.unwrap();

        assert_eq!(doc.original_filename, "cv.pdf");
        assert_eq!(doc.mime_extension, "pdf");
        assert_eq!(doc.size_bytes, 15);
        assert!(doc.storage_key.ends_with("_cv.pdf"));
        let on_disk = tokio::fs::read(&doc.stored_path).await.unwrap();
        assert_eq!(on_disk, b"%PDF-1.4 resume");
    }

    #[tokio::test]
    async fn test_extension_check_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let doc = store.store(b"data", "Resume.PDF").await.unwrap();
        assert_eq!(doc.mime_extension, "pdf");
    }

    #[tokio::test]
    async fn test_non_pdf_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("uploads");
        let store = DocumentStore::new(&root);

        for name in ["resume.docx", "resume", "resume.pdf.exe", ".pdf"] {
            let err = store.store(b"%PDF-1.4", name).await.unwrap_err();
            assert!(
                matches!(&err, AppError::Validation(msg) if msg == ONLY_PDF_MESSAGE),
                "{name}: {err:?}"
            );
        }
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_missing_filename_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let err = store.store(b"%PDF-1.4", "  ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == FILE_MISSING_MESSAGE));
    }

    #[tokio::test]
    async fn test_zero_byte_pdf_is_stored() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let doc = store.store(b"", "empty.pdf").await.unwrap();
        assert_eq!(doc.size_bytes, 0);
        assert!(doc.stored_path.exists());
    }

    #[tokio::test]
    async fn test_path_components_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let doc = store.store(b"x", "../../etc/cv.pdf").await.unwrap();
        assert_eq!(doc.original_filename, "cv.pdf");
        assert_eq!(doc.stored_path.parent().unwrap(), dir.path());

        let doc = store.store(b"x", r"C:\Users\me\cv.pdf").await.unwrap();
        assert_eq!(doc.original_filename, "cv.pdf");
    }

    #[tokio::test]
    async fn test_overlong_name_shortened_keeping_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());

        let long = format!("{}.pdf", "a".repeat(245));
        let doc = store.store(b"%PDF", &long).await.unwrap();
        assert!(doc.storage_key.len() <= 255, "{}", doc.storage_key.len());
        assert!(doc.original_filename.ends_with("a.pdf"));
        assert_eq!(doc.original_filename.len(), MAX_NAME_BYTES);
        assert_eq!(tokio::fs::read(&doc.stored_path).await.unwrap(), b"%PDF");

        let accented = format!("{}.PDF", "é".repeat(150));
        let doc = store.store(b"%PDF", &accented).await.unwrap();
        assert!(doc.original_filename.len() <= MAX_NAME_BYTES);
        assert!(doc.original_filename.ends_with("é.PDF"));
        assert!(doc.stored_path.exists());
    }

    #[tokio::test]
    async fn test_control_characters_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("uploads");
        let store = DocumentStore::new(&root);

        for name in ["cv\0.pdf", "cv\n.pdf", "\u{7}cv.pdf"] {
            let err = store.store(b"%PDF", name).await.unwrap_err();
            assert!(
                matches!(&err, AppError::Validation(msg) if msg == INVALID_FILENAME_MESSAGE),
                "{name:?}: {err:?}"
            );
        }
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_concurrent_same_name_uploads_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DocumentStore::new(dir.path()));

        let handles: Vec<_> = (0..16u8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.store(&[i; 32], "cv.pdf").await })
            })
            .collect();

        let mut keys = HashSet::new();
        for (i, handle) in handles.into_iter().enumerate() {
            let doc = handle.await.unwrap().unwrap();
            let content = tokio::fs::read(&doc.stored_path).await.unwrap();
            assert_eq!(content, vec![i as u8; 32]);
            keys.insert(doc.storage_key);
        }
        assert_eq!(keys.len(), 16);
    }

    #[tokio::test]
    async fn test_unwritable_root_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file in the way").unwrap();

        let store = DocumentStore::new(blocker.join("uploads"));
        let err = store.store(b"%PDF", "cv.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)), "{err:?}");
    }

    #[test]
    fn test_stamps_strictly_increase() {
        let store = DocumentStore::new("unused");
        let first = store.next_stamp();
        let second = store.next_stamp();
        let third = store.next_stamp();
        assert!(first < second && second < third);
    }
}
