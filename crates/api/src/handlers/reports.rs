//! Report generation. Each endpoint lays out a document, renders it to PDF,
//! archives the bytes under `reports/<kind>` and returns the file record.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use detailhq_core::files::{FileRecord, PDF_CONTENT_TYPE, REPORTS_PATH};
use detailhq_core::types::{EntityId, Timestamp};
use detailhq_report::reports::{coupon_report, customer_report, task_report};
use detailhq_report::{render_pdf, Document};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

fn report_name(kind: &str, generated_at: Timestamp) -> String {
    format!("{kind}-report-{}.pdf", generated_at.format("%Y%m%d-%H%M%S"))
}

async fn archive_report(
    state: &AppState,
    document: &Document,
    kind: &str,
    name: String,
) -> AppResult<FileRecord> {
    let bytes = render_pdf(document);
    let path = format!("{REPORTS_PATH}/{kind}");
    let record = state
        .archive
        .store(&name, &path, PDF_CONTENT_TYPE, bytes)
        .await?;
    tracing::info!(
        file_id = %record.id,
        path = %record.path,
        pages = document.pages.len(),
        size = record.size,
        "Report archived"
    );
    Ok(record)
}

/// POST /reports/tasks
pub async fn generate_task_report(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let document = {
        let store = state.stores.tasks.lock().await;
        task_report(store.tasks(), now)
    };
    let record = archive_report(&state, &document, "tasks", report_name("tasks", now)).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// POST /reports/customers/{id}
///
/// Service sheet for one customer or prospect.
pub async fn generate_customer_report(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let document = {
        let store = state.stores.customers.lock().await;
        customer_report(store.get(id)?, now)
    };
    let name = format!("customer-{id}-{}.pdf", now.format("%Y%m%d-%H%M%S"));
    let record = archive_report(&state, &document, "customers", name).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// POST /reports/coupons
pub async fn generate_coupon_report(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let document = {
        let store = state.stores.coupons.lock().await;
        coupon_report(&store.rows(), now)
    };
    let record =
        archive_report(&state, &document, "coupons", report_name("coupons", now)).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}
