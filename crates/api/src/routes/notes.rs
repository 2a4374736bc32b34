//! Notebook, section and note routes, mounted at `/notebooks`, `/sections`
//! and `/notes` by `api_routes()`.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::notes;
use crate::state::AppState;

/// ```text
/// GET    /        -> list_notebooks
/// POST   /        -> create_notebook
/// GET    /{id}    -> get_notebook
/// PUT    /{id}    -> update_notebook
/// DELETE /{id}    -> delete_notebook (cascades)
/// ```
pub fn notebooks_router() -> Router<AppState> {
    Router::new()
        .route("/", get(notes::list_notebooks).post(notes::create_notebook))
        .route(
            "/{id}",
            get(notes::get_notebook)
                .put(notes::update_notebook)
                .delete(notes::delete_notebook),
        )
}

/// ```text
/// GET    /        -> list_sections (?notebook_id=)
/// POST   /        -> create_section
/// GET    /{id}    -> get_section
/// PUT    /{id}    -> update_section
/// DELETE /{id}    -> delete_section (cascades)
/// ```
pub fn sections_router() -> Router<AppState> {
    Router::new()
        .route("/", get(notes::list_sections).post(notes::create_section))
        .route(
            "/{id}",
            get(notes::get_section)
                .put(notes::update_section)
                .delete(notes::delete_section),
        )
}

/// ```text
/// GET    /             -> list_notes
/// POST   /             -> create_note
/// GET    /visible      -> visible_notes (?notebook_id=&section=&q=)
/// GET    /selection    -> get_selection
/// PUT    /selection    -> set_selection
/// GET    /{id}         -> get_note
/// PUT    /{id}         -> update_note
/// DELETE /{id}         -> delete_note
/// PATCH  /{id}/pin     -> toggle_pin
/// PATCH  /{id}/lock    -> toggle_lock
/// ```
pub fn notes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(notes::list_notes).post(notes::create_note))
        .route("/visible", get(notes::visible_notes))
        .route(
            "/selection",
            get(notes::get_selection).put(notes::set_selection),
        )
        .route(
            "/{id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/{id}/pin", patch(notes::toggle_pin))
        .route("/{id}/lock", patch(notes::toggle_lock))
}
