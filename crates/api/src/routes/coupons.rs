//! Mounted at `/coupons` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::coupons;
use crate::state::AppState;

/// ```text
/// GET    /              -> list_coupons
/// POST   /              -> create_coupon
/// GET    /{id}          -> get_coupon
/// PUT    /{id}          -> update_coupon
/// DELETE /{id}          -> delete_coupon
/// POST   /{id}/redeem   -> redeem_coupon
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(coupons::list_coupons).post(coupons::create_coupon))
        .route(
            "/{id}",
            get(coupons::get_coupon)
                .put(coupons::update_coupon)
                .delete(coupons::delete_coupon),
        )
        .route("/{id}/redeem", post(coupons::redeem_coupon))
}
