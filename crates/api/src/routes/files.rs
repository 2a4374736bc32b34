//! Mounted at `/files` by `api_routes()`.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use detailhq_core::files::MAX_UPLOAD_BYTES;

use crate::handlers::files;
use crate::state::AppState;

/// Headroom above the upload limit so oversized bodies still reach the
/// handler and get a JSON `FILE_TOO_LARGE` error.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

/// ```text
/// GET    /        -> list_files (?path=)
/// POST   /        -> upload_file (?name=&path=, raw body)
/// GET    /{id}    -> download_file
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(files::list_files).post(files::upload_file))
        .route("/{id}", get(files::download_file))
        .layer(DefaultBodyLimit::max(
            MAX_UPLOAD_BYTES as usize + BODY_LIMIT_SLACK,
        ))
}
