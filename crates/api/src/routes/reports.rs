//! Mounted at `/reports` by `api_routes()`.

use axum::routing::post;
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// ```text
/// POST /tasks             -> generate_task_report
/// POST /customers/{id}    -> generate_customer_report
/// POST /coupons           -> generate_coupon_report
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", post(reports::generate_task_report))
        .route("/customers/{id}", post(reports::generate_customer_report))
        .route("/coupons", post(reports::generate_coupon_report))
}
