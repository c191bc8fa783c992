//! Handlers for the `/modules` resource.
//!
//! Modules are the navigable sections of the admin console. They form a
//! tree through `parent_module_id` and can be deactivated without being
//! deleted.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use primefire_core::error::CoreError;
use primefire_core::types::DbId;
use primefire_db::models::module::{CreateModule, Module, ModuleNode, UpdateModule};
use primefire_db::repositories::ModuleRepo;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Module",
        id,
    })
}

/// GET /api/v1/modules
///
/// List modules ordered by display order, then name. Inactive modules are
/// hidden unless `?include_inactive=true`.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Module>>>> {
    let modules = ModuleRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: modules }))
}

/// POST /api/v1/modules
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateModule>,
) -> AppResult<(StatusCode, Json<DataResponse<Module>>)> {
    let module = ModuleRepo::create(&state.pool, &input).await?;
    tracing::info!(module_id = module.id, key = %module.key, "Module created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: module })))
}

/// GET /api/v1/modules/tree
pub async fn tree(
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<ModuleNode>>>> {
    let tree = ModuleRepo::tree(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: tree }))
}

/// GET /api/v1/modules/roots
pub async fn roots(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Module>>>> {
    let modules = ModuleRepo::list_roots(&state.pool).await?;
    Ok(Json(DataResponse { data: modules }))
}

/// GET /api/v1/modules/by-key/{key}
pub async fn get_by_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<DataResponse<Module>>> {
    let Some(module) = ModuleRepo::find_by_key(&state.pool, &key).await? else {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity: "Module",
            key,
        }));
    };
    Ok(Json(DataResponse { data: module }))
}

/// GET /api/v1/modules/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Module>>> {
    let module = ModuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: module }))
}

/// PUT /api/v1/modules/{id}
///
/// Partial update. Moving a module under one of its own descendants is
/// rejected with 400.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateModule>,
) -> AppResult<Json<DataResponse<Module>>> {
    let module = ModuleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: module }))
}

/// DELETE /api/v1/modules/{id}
///
/// Returns 409 while the module still has children.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if ModuleRepo::delete(&state.pool, id).await? {
        tracing::info!(module_id = id, "Module deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/modules/{id}/children
pub async fn children(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Module>>>> {
    ModuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let modules = ModuleRepo::list_children(&state.pool, id).await?;
    Ok(Json(DataResponse { data: modules }))
}

/// PATCH /api/v1/modules/{id}/toggle-active
pub async fn toggle_active(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Module>>> {
    let module = ModuleRepo::toggle_active(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(module_id = id, is_active = module.is_active, "Module active flag toggled");
    Ok(Json(DataResponse { data: module }))
}
