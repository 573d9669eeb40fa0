//! API request handlers.

use super::error::ApiError;
use super::types::{ApiState, HealthResponse, UPLOAD_FIELD};
use crate::files::{ExportFormat, FileRecord, Upload};
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Upload endpoint handler.
///
/// POST /files
///
/// Every multipart part named `files` is one upload; other parts are
/// ignored. All uploads are extracted before any is stored, so a single
/// unreadable file fails the request with nothing persisted.
pub async fn upload_handler(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<FileRecord>>, ApiError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await?;
        uploads.push(Upload::new(file_name, data.to_vec()));
    }

    if uploads.is_empty() {
        return Err(ApiError::validation(format!(
            "No files provided under the '{UPLOAD_FIELD}' field"
        )));
    }

    let records = state.service.ingest(uploads).await?;
    Ok(Json(records))
}

/// GET /files
pub async fn list_handler(State(state): State<ApiState>) -> Result<Json<Vec<FileRecord>>, ApiError> {
    Ok(Json(state.service.list()?))
}

/// GET /files/{id}
pub async fn get_handler(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<FileRecord>, ApiError> {
    Ok(Json(state.service.get(id)?))
}

/// GET /files/{id}/export/json
pub async fn export_json_handler(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    export_response(&state, id, ExportFormat::Json)
}

/// GET /files/{id}/export/csv
pub async fn export_csv_handler(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    export_response(&state, id, ExportFormat::Csv)
}

fn export_response(state: &ApiState, id: i64, format: ExportFormat) -> Result<Response, ApiError> {
    let body = state.service.export(id, format)?;
    let disposition = format!("attachment; filename=\"{}\"", format.attachment_name(id));
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// GET /health
pub async fn health_handler(State(state): State<ApiState>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        records: state.service.store().count()?,
    }))
}
