use axum::{extract::State, Json};

use crate::error::{ApiError, ApiResult};
use crate::models::FileRecord;
use crate::AppState;

/// List every stored file version
///
/// GET <root>
pub async fn list_files(State(state): State<AppState>) -> ApiResult<Json<Vec<FileRecord>>> {
    let records = state.files.list_files().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list objects from storage");
        ApiError::from(e)
    })?;

    tracing::debug!(count = records.len(), "Listed files");
    Ok(Json(records))
}
