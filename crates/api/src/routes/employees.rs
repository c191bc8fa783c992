use axum::routing::{get, post};
use axum::Router;

use crate::handlers::employees;
use crate::state::AppState;

/// Routes mounted at `/employees`.
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> delete
/// GET    /{id}/roles              -> roles
/// POST   /{id}/roles/{role_id}    -> assign_role
/// DELETE /{id}/roles/{role_id}    -> revoke_role
/// GET    /{id}/permissions        -> effective_permissions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(employees::list).post(employees::create))
        .route(
            "/{id}",
            get(employees::get_by_id)
                .put(employees::update)
                .delete(employees::delete),
        )
        .route("/{id}/roles", get(employees::roles))
        .route(
            "/{id}/roles/{role_id}",
            post(employees::assign_role).delete(employees::revoke_role),
        )
        .route("/{id}/permissions", get(employees::effective_permissions))
}
