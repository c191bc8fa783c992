pub mod employees;
pub mod health;
pub mod modules;
pub mod permissions;
pub mod roles;
pub mod tickets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /modules                                         list (?include_inactive), create
/// /modules/tree                                    nested tree (?include_inactive)
/// /modules/roots                                   active root modules
/// /modules/by-key/{key}                            get by key
/// /modules/{id}                                    get, update, delete
/// /modules/{id}/children                           active children
/// /modules/{id}/toggle-active                      flip active flag (PATCH)
///
/// /permissions                                     list with details, create
/// /permissions/role/{role_id}                      one role's rows
/// /permissions/module/{module_id}                  one module's rows
/// /permissions/bulk-update                         replace a role's rows (POST)
/// /permissions/check/{module_key}/{action}         evaluate (?employee_id)
/// /permissions/{role_id}/{module_id}               get, update, delete
///
/// /roles                                           list, create
/// /roles/{id}                                      get, update, delete
///
/// /employees                                       list, create
/// /employees/{id}                                  get, update, delete
/// /employees/{id}/roles                            held roles
/// /employees/{id}/roles/{role_id}                  assign (POST), revoke
/// /employees/{id}/permissions                      effective access
///
/// /tickets                                         list (filters), create
/// /tickets/{id}                                    get, update, delete
/// /tickets/{id}/status                             change status (PATCH)
/// /tickets/{id}/assignee                           set or clear assignee (PATCH)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/modules", modules::router())
        .nest("/permissions", permissions::router())
        .nest("/roles", roles::router())
        .nest("/employees", employees::router())
        .nest("/tickets", tickets::router())
}
