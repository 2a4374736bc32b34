//! Handlers for pro-tips. These live only in the local cache and never
//! reach the remote tier, so there is no sync status to report.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use detailhq_core::error::CoreError;
use detailhq_core::pro_tip::ProTip;
use detailhq_core::types::EntityId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProTipInput {
    pub text: String,
}

pub async fn list_pro_tips(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let tips = state.stores.pro_tips.lock().await.items().to_vec();
    Ok(Json(DataResponse { data: tips }))
}

pub async fn create_pro_tip(
    State(state): State<AppState>,
    Json(input): Json<ProTipInput>,
) -> AppResult<impl IntoResponse> {
    let tip = ProTip::new(&input.text, Utc::now())?;
    state.stores.pro_tips.lock().await.push(tip.clone()).await?;
    tracing::info!(tip_id = %tip.id, "Pro-tip added");
    Ok((StatusCode::CREATED, Json(DataResponse { data: tip })))
}

pub async fn delete_pro_tip(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let removed = state
        .stores
        .pro_tips
        .lock()
        .await
        .remove_where(|t| t.id == id)
        .await?;
    if removed == 0 {
        return Err(CoreError::not_found("ProTip", id).into());
    }
    tracing::info!(tip_id = %id, "Pro-tip deleted");
    Ok(StatusCode::NO_CONTENT)
}
