//! Handlers for the team message board.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use detailhq_core::message::TeamMessageDraft;

use crate::error::AppResult;
use crate::response::SyncedResponse;
use crate::state::AppState;

/// GET /messages -- chronological.
pub async fn list_messages(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.messages.lock().await;
    store.refresh().await?;
    let messages = store.messages();
    Ok(Json(SyncedResponse::new(messages, store.status())))
}

/// POST /messages
pub async fn post_message(
    State(state): State<AppState>,
    Json(input): Json<TeamMessageDraft>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.messages.lock().await;
    let message = store.post(input, Utc::now())?;
    store.flush().await;
    Ok((
        StatusCode::CREATED,
        Json(SyncedResponse::new(message, store.status())),
    ))
}
