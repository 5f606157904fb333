use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
};

use super::validation;
use crate::error::{ApiError, ApiResult};
use crate::models::DownloadQuery;
use crate::AppState;

/// Stream one object version back to the client
///
/// GET <root>/<download-path>?fileName=<key>&versionId=<id>
pub async fn download_file(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> ApiResult<impl IntoResponse> {
    let file_name =
        validation::require_param(query.file_name, "fileName").map_err(ApiError::BadRequest)?;
    let version_id =
        validation::require_param(query.version_id, "versionId").map_err(ApiError::BadRequest)?;

    tracing::info!(filename = %file_name, version_id = %version_id, "Received download request");

    let object = state
        .files
        .download_file(&file_name, &version_id)
        .await
        .map_err(|e| {
            tracing::error!(
                filename = %file_name,
                version_id = %version_id,
                error = %e,
                "Failed to get file from storage"
            );
            ApiError::from(e)
        })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        validation::content_disposition(&file_name),
    );
    if let Some(length) = object.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    Ok((headers, Body::from_stream(object.stream)))
}
