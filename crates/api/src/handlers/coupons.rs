//! Handlers for discount coupons.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use detailhq_core::coupon::CouponDraft;
use detailhq_core::types::EntityId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::SyncedResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RedeemInput {
    pub price: f64,
}

/// GET /coupons
///
/// Table rows (code, type, value, uses left, status), sorted by code.
pub async fn list_coupons(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.coupons.lock().await;
    store.refresh().await?;
    let rows = store.rows();
    Ok(Json(SyncedResponse::new(rows, store.status())))
}

/// POST /coupons
///
/// Codes are case-insensitive; a duplicate code is a 409.
pub async fn create_coupon(
    State(state): State<AppState>,
    Json(input): Json<CouponDraft>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.coupons.lock().await;
    let coupon = store.create(input, Utc::now())?;
    store.flush().await;
    Ok((
        StatusCode::CREATED,
        Json(SyncedResponse::new(coupon, store.status())),
    ))
}

pub async fn get_coupon(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let store = state.stores.coupons.lock().await;
    let coupon = store.get(id)?.clone();
    Ok(Json(SyncedResponse::new(coupon, store.status())))
}

pub async fn update_coupon(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<CouponDraft>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.coupons.lock().await;
    let coupon = store.update(id, input, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(coupon, store.status())))
}

pub async fn delete_coupon(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.coupons.lock().await;
    let coupon = store.delete(id)?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(coupon, store.status())))
}

/// POST /coupons/{id}/redeem
///
/// Consumes one use. Inactive or exhausted coupons are a 409.
pub async fn redeem_coupon(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<RedeemInput>,
) -> AppResult<impl IntoResponse> {
    let mut store = state.stores.coupons.lock().await;
    let redemption = store.redeem(id, input.price, Utc::now())?;
    store.flush().await;
    Ok(Json(SyncedResponse::new(redemption, store.status())))
}
