//! Route definitions for the `/modules` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::modules;
use crate::state::AppState;

/// Routes mounted at `/modules`.
///
/// ```text
/// GET    /                      -> list (?include_inactive)
/// POST   /                      -> create
/// GET    /tree                  -> tree (?include_inactive)
/// GET    /roots                 -> roots
/// GET    /by-key/{key}          -> get_by_key
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update
/// DELETE /{id}                  -> delete
/// GET    /{id}/children         -> children
/// PATCH  /{id}/toggle-active    -> toggle_active
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(modules::list).post(modules::create))
        .route("/tree", get(modules::tree))
        .route("/roots", get(modules::roots))
        .route("/by-key/{key}", get(modules::get_by_key))
        .route(
            "/{id}",
            get(modules::get_by_id)
                .put(modules::update)
                .delete(modules::delete),
        )
        .route("/{id}/children", get(modules::children))
        .route("/{id}/toggle-active", patch(modules::toggle_active))
}
