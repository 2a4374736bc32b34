//! Handlers for tasks: CRUD, derived views, manual ordering, bulk actions,
//! comments, read receipts and checklist toggles.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use detailhq_core::task::{TaskDraft, TaskFilter, TaskPatch};
use detailhq_core::types::EntityId;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::query::TaskViewParams;
use crate::response::SyncedResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IdsInput {
    pub ids: Vec<EntityId>,
}

#[derive(Debug, Deserialize)]
pub struct MoveInput {
    pub to_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct CommentInput {
    pub author: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadInput {
    pub user: String,
}

/// Result of a bulk or ordering operation.
#[derive(Debug, Serialize)]
pub struct AffectedIds {
    pub ids: Vec<EntityId>,
}

#[derive(Debug, Serialize)]
pub struct Reordered {
    pub changed: usize,
}

#[derive(Debug, Serialize)]
pub struct ChecklistToggled {
    pub task_id: EntityId,
    pub item_id: EntityId,
    pub done: bool,
}

// ---------------------------------------------------------------------------
// GET /tasks
// ---------------------------------------------------------------------------

/// Derived task view. `view` defaults to `all`; `mine` needs `user`.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskViewParams>,
) -> AppResult<impl IntoResponse> {
    let filter = match params.view.as_deref() {
        Some(v) => TaskFilter::parse(v)?,
        None => TaskFilter::All,
    };

    let mut store = state.stores.tasks.lock().await;
    store.refresh().await?;
    let tasks = store.view(
        filter,
        params.user.as_deref(),
        Utc::now().naive_utc(),
        params.priority_sort,
    );
    Ok(Json(SyncedResponse::new(tasks, store.status())))
}

// ---------------------------------------------------------------------------
// POST /tasks
// ---------------------------------------------------------------------------

pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<TaskDraft>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.tasks.lock().await;
    let task = store.add(input, Utc::now())?;
    store.flush().await;
    Ok((
        StatusCode::CREATED,
        Json(SyncedResponse::new(task, store.status())),
    ))
}

// ---------------------------------------------------------------------------
// /tasks/{id}
// ---------------------------------------------------------------------------

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let store = state.stores.tasks.lock().await;
    let task = store.get(id)?.clone();
    Ok(Json(SyncedResponse::new(task, store.status())))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<TaskPatch>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.tasks.lock().await;
    let task = store.update(id, input, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(task, store.status())))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.tasks.lock().await;
    let task = store.remove(id)?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(task, store.status())))
}

// ---------------------------------------------------------------------------
// Ordering and bulk actions
// ---------------------------------------------------------------------------

/// POST /tasks/reorder
///
/// Assigns `order = index` to each listed id. Unknown ids are ignored.
pub async fn reorder_tasks(
    State(state): State<AppState>,
    Json(input): Json<IdsInput>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.tasks.lock().await;
    let changed = store.reorder(&input.ids, Utc::now());
    store.flush().await;
    Ok(Json(SyncedResponse::new(Reordered { changed }, store.status())))
}

/// POST /tasks/{id}/move
pub async fn move_task(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<MoveInput>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.tasks.lock().await;
    let changed = store.move_task(id, input.to_index, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(Reordered { changed }, store.status())))
}

/// POST /tasks/bulk-complete
pub async fn bulk_complete_tasks(
    State(state): State<AppState>,
    Json(input): Json<IdsInput>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.tasks.lock().await;
    let ids = store.bulk_complete(&input.ids, Utc::now());
    store.flush().await;
    Ok(Json(SyncedResponse::new(AffectedIds { ids }, store.status())))
}

/// POST /tasks/bulk-delete
pub async fn bulk_delete_tasks(
    State(state): State<AppState>,
    Json(input): Json<IdsInput>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.tasks.lock().await;
    let ids = store.bulk_delete(&input.ids);
    store.flush().await;
    Ok(Json(SyncedResponse::new(AffectedIds { ids }, store.status())))
}

// ---------------------------------------------------------------------------
// Comments, read receipts, checklist
// ---------------------------------------------------------------------------

/// POST /tasks/{id}/comments
pub async fn add_task_comment(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<CommentInput>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.tasks.lock().await;
    let comment = store.add_comment(id, &input.author, &input.text, Utc::now())?;
    store.flush().await;
    Ok((
        StatusCode::CREATED,
        Json(SyncedResponse::new(comment, store.status())),
    ))
}

/// POST /tasks/{id}/read
pub async fn mark_task_read(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<ReadInput>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.tasks.lock().await;
    let task = store.mark_read(id, &input.user, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(task, store.status())))
}

/// POST /tasks/{id}/checklist/{item_id}/toggle
pub async fn toggle_checklist_item(
    State(state): State<AppState>,
    Path((task_id, item_id)): Path<(EntityId, EntityId)>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.tasks.lock().await;
    let done = store.toggle_checklist_item(task_id, item_id, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(
        ChecklistToggled {
            task_id,
            item_id,
            done,
        },
        store.status(),
    )))
}
