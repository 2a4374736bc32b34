//! Handlers for the assistant chat log and tool usage counters. Both are
//! kept in the local cache only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use detailhq_core::assistant::{
    append_chat_entry, normalize_tool_name, record_tool_use, sort_by_usage, ChatEntry, ChatRole,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatEntryInput {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub cleared: usize,
}

// ---------------------------------------------------------------------------
// Chat log
// ---------------------------------------------------------------------------

pub async fn list_chat_log(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let entries = state.stores.chat_log.lock().await.items().to_vec();
    Ok(Json(DataResponse { data: entries }))
}

pub async fn append_chat(
    State(state): State<AppState>,
    Json(input): Json<ChatEntryInput>,
) -> AppResult<impl IntoResponse> {
    let entry = ChatEntry::new(input.role, &input.text, Utc::now())?;
    let stored = entry.clone();
    state
        .stores
        .chat_log
        .lock()
        .await
        .update(|log| append_chat_entry(log, stored))
        .await?;
    tracing::debug!(entry_id = %entry.id, role = ?entry.role, "Chat entry logged");
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

pub async fn clear_chat_log(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let cleared = state.stores.chat_log.lock().await.clear().await?;
    tracing::info!(cleared, "Chat log cleared");
    Ok(Json(DataResponse {
        data: ClearedResponse { cleared },
    }))
}

// ---------------------------------------------------------------------------
// Tool usage
// ---------------------------------------------------------------------------

pub async fn list_tool_usage(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut usages = state.stores.tool_usage.lock().await.items().to_vec();
    sort_by_usage(&mut usages);
    Ok(Json(DataResponse { data: usages }))
}

pub async fn record_tool(
    State(state): State<AppState>,
    Path(tool): Path<String>,
) -> AppResult<impl IntoResponse> {
    let tool = normalize_tool_name(&tool)?;
    let usage = state
        .stores
        .tool_usage
        .lock()
        .await
        .update(|usages| record_tool_use(usages, &tool, Utc::now()))
        .await??;
    tracing::debug!(tool = %usage.tool, count = usage.count, "Tool use recorded");
    Ok(Json(DataResponse { data: usage }))
}
