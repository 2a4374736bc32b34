//! Mounted at `/pro-tips` by `api_routes()`.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::pro_tips;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pro_tips::list_pro_tips).post(pro_tips::create_pro_tip))
        .route("/{id}", delete(pro_tips::delete_pro_tip))
}
