//! Mounted at `/assistant` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::assistant;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/chat",
            get(assistant::list_chat_log)
                .post(assistant::append_chat)
                .delete(assistant::clear_chat_log),
        )
        .route("/tools", get(assistant::list_tool_usage))
        .route("/tools/{tool}", post(assistant::record_tool))
}
