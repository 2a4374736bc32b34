//! Mounted at `/library` by `api_routes()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::library;
use crate::state::AppState;

/// ```text
/// GET    /                 -> list_items (?category=)
/// POST   /                 -> create_item
/// GET    /{id}             -> get_item
/// PUT    /{id}             -> update_item
/// DELETE /{id}             -> delete_item
/// GET    /{id}/comments    -> list_comments
/// POST   /{id}/comments    -> add_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(library::list_items).post(library::create_item))
        .route(
            "/{id}",
            get(library::get_item)
                .put(library::update_item)
                .delete(library::delete_item),
        )
        .route(
            "/{id}/comments",
            get(library::list_comments).post(library::add_comment),
        )
}
