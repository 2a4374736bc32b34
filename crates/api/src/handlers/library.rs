//! Handlers for the media library and its comment threads.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use detailhq_core::library::{LibraryCommentDraft, LibraryItemDraft};
use detailhq_core::types::EntityId;

use crate::error::AppResult;
use crate::query::CategoryParams;
use crate::response::SyncedResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// /library
// ---------------------------------------------------------------------------

/// List items, newest first, optionally within one category.
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<CategoryParams>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.library.lock().await;
    store.refresh().await?;
    let items = store.items(params.category.as_deref());
    Ok(Json(SyncedResponse::new(items, store.status())))
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<LibraryItemDraft>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.library.lock().await;
    let item = store.create_item(input, Utc::now())?;
    store.flush().await;
    Ok((
        StatusCode::CREATED,
        Json(SyncedResponse::new(item, store.status())),
    ))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let store = state.stores.library.lock().await;
    let item = store.get(id)?.clone();
    Ok(Json(SyncedResponse::new(item, store.status())))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<LibraryItemDraft>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.library.lock().await;
    let item = store.update_item(id, input, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(item, store.status())))
}

/// DELETE /library/{id}
///
/// Also removes every comment on the item.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.library.lock().await;
    let item = store.delete_item(id)?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(item, store.status())))
}

// ---------------------------------------------------------------------------
// /library/{id}/comments
// ---------------------------------------------------------------------------

pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let store = state.stores.library.lock().await;
    store.get(id)?;
    let comments = store.comments_for(id);
    Ok(Json(SyncedResponse::new(comments, store.status())))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<LibraryCommentDraft>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.library.lock().await;
    let comment = store.add_comment(id, input, Utc::now())?;
    store.flush().await;
    Ok((
        StatusCode::CREATED,
        Json(SyncedResponse::new(comment, store.status())),
    ))
}
