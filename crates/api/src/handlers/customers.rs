//! Handlers for customers and prospects.
//!
//! Every mutation is applied optimistically, flushed to the remote tier, and
//! answered with the resulting sync status. A remote failure leaves a failed
//! command behind instead of failing the request.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use detailhq_core::customer::{CustomerDraft, CustomerKind};
use detailhq_core::types::EntityId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::query::CustomerListParams;
use crate::response::SyncedResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ArchiveInput {
    #[serde(default = "default_archived")]
    pub archived: bool,
}

fn default_archived() -> bool {
    true
}

// ---------------------------------------------------------------------------
// GET /customers
// ---------------------------------------------------------------------------

/// List customers (default) or prospects, sorted by name.
pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<CustomerListParams>,
) -> AppResult<impl IntoResponse> {
    let kind = match params.kind.as_deref() {
        Some(k) => CustomerKind::parse(k)?,
        None => CustomerKind::Customer,
    };

    let mut store = state.stores.customers.lock().await;
    store.refresh().await?;
    let rows = store.list(kind, params.include_archived);
    Ok(Json(SyncedResponse::new(rows, store.status())))
}

// ---------------------------------------------------------------------------
// POST /customers
// ---------------------------------------------------------------------------

pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerDraft>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.customers.lock().await;
    let customer = store.create(input, Utc::now())?;
    store.flush().await;
    Ok((
        StatusCode::CREATED,
        Json(SyncedResponse::new(customer, store.status())),
    ))
}

/// POST /customers/import
///
/// Create from a legacy record whose condition ratings are embedded in the
/// notes as a tag.
pub async fn import_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerDraft>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.customers.lock().await;
    let customer = store.import_legacy(input, Utc::now())?;
    store.flush().await;
    Ok((
        StatusCode::CREATED,
        Json(SyncedResponse::new(customer, store.status())),
    ))
}

// ---------------------------------------------------------------------------
// /customers/{id}
// ---------------------------------------------------------------------------

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let store = state.stores.customers.lock().await;
    let customer = store.get(id)?.clone();
    Ok(Json(SyncedResponse::new(customer, store.status())))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<CustomerDraft>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.customers.lock().await;
    let customer = store.update(id, input, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(customer, store.status())))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.customers.lock().await;
    let customer = store.delete(id)?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(customer, store.status())))
}

/// POST /customers/{id}/convert
pub async fn convert_customer(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.customers.lock().await;
    let customer = store.convert(id, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(customer, store.status())))
}

/// POST /customers/{id}/archive
///
/// Body `{"archived": false}` restores a record; an empty object archives.
pub async fn archive_customer(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<ArchiveInput>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.customers.lock().await;
    let customer = store.set_archived(id, input.archived, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(customer, store.status())))
}
