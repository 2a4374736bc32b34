//! Handlers exposing the command queue: what is pending, what failed, and a
//! manual retry.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use detailhq_store::{FlushReport, SyncStatus};
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RetryOutcome {
    pub report: FlushReport,
    pub status: SyncStatus,
}

#[derive(Debug, Serialize)]
pub struct Pruned {
    pub pruned: usize,
}

/// GET /sync -- totals plus every tracked command, oldest first.
pub async fn sync_summary(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let summary = state.stores.sync_summary().await;
    Ok(Json(DataResponse { data: summary }))
}

/// POST /sync/retry -- replay every failed command.
pub async fn retry_failed(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let report = state.stores.retry_all().await;
    let status = state.stores.sync_summary().await.status;
    Ok(Json(DataResponse {
        data: RetryOutcome { report, status },
    }))
}

/// DELETE /sync/confirmed -- drop confirmed command history.
pub async fn prune_confirmed(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let pruned = state.stores.prune_confirmed().await;
    tracing::info!(pruned, "Confirmed commands pruned");
    Ok(Json(DataResponse {
        data: Pruned { pruned },
    }))
}
