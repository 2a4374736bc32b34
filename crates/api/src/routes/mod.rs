pub mod assistant;
pub mod coupons;
pub mod customers;
pub mod files;
pub mod health;
pub mod library;
pub mod messages;
pub mod notes;
pub mod pro_tips;
pub mod reports;
pub mod sync;
pub mod tasks;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /customers      customers and prospects
/// /tasks          tasks, views, ordering, bulk actions
/// /notebooks      notebooks
/// /sections       notebook sections
/// /notes          notes, visible-notes view, selection
/// /coupons        discount coupons
/// /library        media library and comments
/// /messages       team message board
/// /pro-tips       client-only tips (local cache)
/// /assistant      chat log and tool usage (local cache)
/// /reports        PDF report generation
/// /files          archive listing, download, upload
/// /sync           command queue summary and retry
/// /events         server-sent change events
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/customers", customers::router())
        .nest("/tasks", tasks::router())
        .nest("/notebooks", notes::notebooks_router())
        .nest("/sections", notes::sections_router())
        .nest("/notes", notes::notes_router())
        .nest("/coupons", coupons::router())
        .nest("/library", library::router())
        .nest("/messages", messages::router())
        .nest("/pro-tips", pro_tips::router())
        .nest("/assistant", assistant::router())
        .nest("/reports", reports::router())
        .nest("/files", files::router())
        .nest("/sync", sync::router())
        .route("/events", get(handlers::events::change_stream))
}
