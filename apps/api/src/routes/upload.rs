//! Axum route handler for resume uploads.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::pipeline::PipelineResult;
use crate::state::AppState;
use crate::storage::FILE_MISSING_MESSAGE;

/// Multipart field the resume must be sent under.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub data: PipelineResult,
}

struct FilePart {
    filename: String,
    bytes: Bytes,
}

/// POST /upload/cv
///
/// Stores the resume, then enriches it with recommendations, a review and
/// job listings. Downstream outages degrade the payload but never the status.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let request_id = Uuid::new_v4();

    async move {
        let mut multipart = multipart?;
        let file = read_file_part(&mut multipart)
            .await?
            .ok_or_else(|| AppError::Validation(FILE_MISSING_MESSAGE.to_string()))?;

        info!("Received {} ({} bytes)", file.filename, file.bytes.len());

        let data = state.pipeline.run(&file.bytes, &file.filename).await?;

        Ok::<_, AppError>((
            StatusCode::CREATED,
            Json(UploadResponse {
                status: "success",
                message: "File uploaded",
                data,
            }),
        ))
    }
    .instrument(info_span!("upload", %request_id))
    .await
}

/// Returns the first `file` part that carries a filename; other fields are skipped.
async fn read_file_part(multipart: &mut Multipart) -> Result<Option<FilePart>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field
            .file_name()
            .map(str::to_owned)
            .filter(|name| !name.trim().is_empty())
        else {
            continue;
        };

        let bytes = field.bytes().await?;
        return Ok(Some(FilePart { filename, bytes }));
    }
    Ok(None)
}
