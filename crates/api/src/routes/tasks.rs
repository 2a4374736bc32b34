//! Mounted at `/tasks` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// ```text
/// GET    /                                  -> list_tasks (?view=&user=&priority_sort=)
/// POST   /                                  -> create_task
/// POST   /reorder                           -> reorder_tasks
/// POST   /bulk-complete                     -> bulk_complete_tasks
/// POST   /bulk-delete                       -> bulk_delete_tasks
/// GET    /{id}                              -> get_task
/// PUT    /{id}                              -> update_task
/// DELETE /{id}                              -> delete_task
/// POST   /{id}/move                         -> move_task
/// POST   /{id}/comments                     -> add_task_comment
/// POST   /{id}/read                         -> mark_task_read
/// POST   /{id}/checklist/{item_id}/toggle   -> toggle_checklist_item
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route("/reorder", post(tasks::reorder_tasks))
        .route("/bulk-complete", post(tasks::bulk_complete_tasks))
        .route("/bulk-delete", post(tasks::bulk_delete_tasks))
        .route(
            "/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/{id}/move", post(tasks::move_task))
        .route("/{id}/comments", post(tasks::add_task_comment))
        .route("/{id}/read", post(tasks::mark_task_read))
        .route(
            "/{id}/checklist/{item_id}/toggle",
            post(tasks::toggle_checklist_item),
        )
}
