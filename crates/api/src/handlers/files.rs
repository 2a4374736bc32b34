//! Handlers for the file archive: listing, download and media upload.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use detailhq_core::files::{validate_file_name, validate_upload, validate_upload_path};
use detailhq_core::types::EntityId;

use crate::error::AppResult;
use crate::query::{PathParams, UploadParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /files?path=reports -- newest first.
pub async fn list_files(
    State(state): State<AppState>,
    Query(params): Query<PathParams>,
) -> AppResult<impl IntoResponse> {
    let files = state.archive.list(params.path.as_deref()).await?;
    Ok(Json(DataResponse { data: files }))
}

/// GET /files/{id} -- the stored bytes as an attachment.
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let (record, bytes) = state.archive.fetch(id).await?;
    let disposition = content_disposition(&record.name);
    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, record.content_type),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// POST /files?name=&path=
///
/// The raw request body is the file; its `Content-Type` header must be an
/// image or video type. Uploads over the size limit are a 413.
pub async fn upload_file(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let name = validate_file_name(&params.name)?;
    let path = validate_upload_path(&params.path)?;
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    validate_upload(body.len() as u64, &content_type)?;

    let record = state
        .archive
        .store(&name, &path, &content_type, body.to_vec())
        .await?;
    tracing::info!(
        file_id = %record.id,
        path = %record.path,
        size = record.size,
        content_type = %record.content_type,
        "File uploaded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// `attachment` disposition with an ASCII `filename` fallback and the exact
/// name as an RFC 5987 `filename*`.
pub fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(name)
    )
}
