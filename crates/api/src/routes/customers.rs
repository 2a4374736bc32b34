//! Mounted at `/customers` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::customers;
use crate::state::AppState;

/// ```text
/// GET    /                 -> list_customers (?type=prospect&include_archived=true)
/// POST   /                 -> create_customer
/// POST   /import           -> import_customer (legacy condition tag)
/// GET    /{id}             -> get_customer
/// PUT    /{id}             -> update_customer
/// DELETE /{id}             -> delete_customer
/// POST   /{id}/convert     -> convert_customer
/// POST   /{id}/archive     -> archive_customer
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route("/import", post(customers::import_customer))
        .route(
            "/{id}",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route("/{id}/convert", post(customers::convert_customer))
        .route("/{id}/archive", post(customers::archive_customer))
}
