//! Route definitions for the `/tickets` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::tickets;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// GET    /                  -> list (?status, ?priority, ?sla, ?assigned_to, ?created_by, ?search)
/// POST   /                  -> create
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// PATCH  /{id}/status       -> set_status
/// PATCH  /{id}/assignee     -> assign
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tickets::list).post(tickets::create))
        .route(
            "/{id}",
            get(tickets::get_by_id)
                .put(tickets::update)
                .delete(tickets::delete),
        )
        .route("/{id}/status", patch(tickets::set_status))
        .route("/{id}/assignee", patch(tickets::assign))
}
