//! Mounted at `/messages` by `api_routes()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::messages;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(messages::list_messages).post(messages::post_message))
}
