//! Mounted at `/sync` by `api_routes()`.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::sync;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sync::sync_summary))
        .route("/retry", post(sync::retry_failed))
        .route("/confirmed", delete(sync::prune_confirmed))
}
