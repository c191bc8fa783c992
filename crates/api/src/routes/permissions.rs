//! Route definitions for the `/permissions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::permissions;
use crate::state::AppState;

/// Routes mounted at `/permissions`.
///
/// ```text
/// GET    /                                 -> list
/// POST   /                                 -> create
/// GET    /role/{role_id}                   -> by_role
/// GET    /module/{module_id}               -> by_module
/// POST   /bulk-update                      -> bulk_update
/// GET    /check/{module_key}/{action}      -> check (?employee_id)
/// GET    /{role_id}/{module_id}            -> get_pair
/// PUT    /{role_id}/{module_id}            -> update_pair
/// DELETE /{role_id}/{module_id}            -> delete_pair
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(permissions::list).post(permissions::create))
        .route("/role/{role_id}", get(permissions::by_role))
        .route("/module/{module_id}", get(permissions::by_module))
        .route("/bulk-update", post(permissions::bulk_update))
        .route("/check/{module_key}/{action}", get(permissions::check))
        .route(
            "/{role_id}/{module_id}",
            get(permissions::get_pair)
                .put(permissions::update_pair)
                .delete(permissions::delete_pair),
        )
}
