use axum::{
    extract::{multipart::Field, Multipart, State},
    Json,
};
use bytes::BytesMut;

use super::validation;
use crate::error::{ApiError, ApiResult};
use crate::models::FileRecord;
use crate::AppState;

/// Multipart field carrying the file
const FILE_FIELD: &str = "file";

/// Handle file upload
///
/// POST <root>/<upload-path>
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<FileRecord>> {
    tracing::info!("Received file upload request");

    // Extract file from multipart form
    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("unknown").to_string();
        tracing::debug!("Processing field: {}", field_name);

        if field_name != FILE_FIELD {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("Upload field 'file' has no filename".to_string()))?;
        validation::validate_file_name(&filename).map_err(ApiError::BadRequest)?;

        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());

        let data = read_field(field, state.max_upload_bytes).await?;
        let size = data.len();

        tracing::info!(
            filename = %filename,
            size,
            content_type = %content_type,
            "File received"
        );

        let record = state
            .files
            .upload_file(&filename, data.freeze(), &content_type)
            .await
            .map_err(|e| {
                tracing::error!(filename = %filename, error = %e, "Failed to upload file to storage");
                ApiError::from(e)
            })?;

        tracing::info!(
            filename = %record.filename,
            version_id = %record.version_id,
            size = record.size,
            "File uploaded successfully"
        );

        return Ok(Json(record));
    }

    Err(ApiError::BadRequest("No file provided".to_string()))
}

/// Collect a field's chunks, failing as soon as the limit is crossed
async fn read_field(mut field: Field<'_>, max_bytes: usize) -> ApiResult<BytesMut> {
    let mut data = BytesMut::new();

    while let Some(chunk) = field.chunk().await? {
        if data.len() + chunk.len() > max_bytes {
            return Err(ApiError::PayloadTooLarge(format!(
                "File too large. Maximum size is {} bytes",
                max_bytes
            )));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(data)
}
