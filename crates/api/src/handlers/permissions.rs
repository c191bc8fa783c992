//! Handlers for the `/permissions` resource.
//!
//! A permission is one `role_modules` row: the capability flags a role
//! holds on a module. Rows are addressed by the `(role_id, module_id)`
//! pair.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use primefire_core::error::CoreError;
use primefire_core::permissions::Capability;
use primefire_core::types::DbId;
use primefire_db::models::role_module::{
    BulkPermissionUpdate, CreatePermission, PermissionDetail, RoleModule, RolePermissions,
    UpdatePermission,
};
use primefire_db::repositories::{EmployeeRepo, ModuleRepo, RoleModuleRepo, RoleRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::query::EmployeeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of evaluating one capability for one employee.
#[derive(Debug, Serialize)]
pub struct PermissionCheck {
    pub employee_id: DbId,
    pub module_key: String,
    pub action: Capability,
    pub allowed: bool,
}

fn pair_not_found(role_id: DbId, module_id: DbId) -> AppError {
    AppError::Core(CoreError::NotFoundByKey {
        entity: "Permission",
        key: format!("{role_id}/{module_id}"),
    })
}

async fn ensure_role(state: &AppState, role_id: DbId) -> AppResult<String> {
    let role = RoleRepo::find_by_id(&state.pool, role_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Role",
            id: role_id,
        }))?;
    Ok(role.name)
}

/// GET /api/v1/permissions
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PermissionDetail>>>> {
    let rows = RoleModuleRepo::list_detailed(&state.pool).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/permissions
///
/// Returns 409 if the role already has a row for the module.
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreatePermission>,
) -> AppResult<(StatusCode, Json<DataResponse<RoleModule>>)> {
    let row = RoleModuleRepo::create(&state.pool, &input).await?;
    tracing::info!(
        role_id = row.role_id,
        module_id = row.module_id,
        "Permission granted"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: row })))
}

/// GET /api/v1/permissions/role/{role_id}
pub async fn by_role(
    State(state): State<AppState>,
    Path(role_id): Path<DbId>,
) -> AppResult<Json<DataResponse<RolePermissions>>> {
    let role_name = ensure_role(&state, role_id).await?;
    let permissions = RoleModuleRepo::list_by_role(&state.pool, role_id).await?;
    Ok(Json(DataResponse {
        data: RolePermissions {
            role_id,
            role_name,
            permissions,
        },
    }))
}

/// GET /api/v1/permissions/module/{module_id}
pub async fn by_module(
    State(state): State<AppState>,
    Path(module_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<PermissionDetail>>>> {
    ModuleRepo::find_by_id(&state.pool, module_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Module",
            id: module_id,
        }))?;
    let rows = RoleModuleRepo::list_by_module(&state.pool, module_id).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/permissions/bulk-update
///
/// Replace every row of a role. A grant naming an unknown module aborts the
/// whole replacement and the role keeps its previous rows.
pub async fn bulk_update(
    State(state): State<AppState>,
    AppJson(input): AppJson<BulkPermissionUpdate>,
) -> AppResult<Json<DataResponse<Vec<RoleModule>>>> {
    ensure_role(&state, input.role_id).await?;
    let rows = RoleModuleRepo::replace_for_role(&state.pool, &input).await?;
    tracing::info!(
        role_id = input.role_id,
        rows = rows.len(),
        "Role permissions replaced"
    );
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/permissions/check/{module_key}/{action}?employee_id=
pub async fn check(
    State(state): State<AppState>,
    Path((module_key, action)): Path<(String, String)>,
    Query(params): Query<EmployeeParams>,
) -> AppResult<Json<DataResponse<PermissionCheck>>> {
    let action: Capability = action.parse()?;

    if ModuleRepo::find_by_key(&state.pool, &module_key)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity: "Module",
            key: module_key,
        }));
    }
    EmployeeRepo::find_by_id(&state.pool, params.employee_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Employee",
            id: params.employee_id,
        }))?;

    let access = RoleModuleRepo::effective_for_employee(&state.pool, params.employee_id).await?;
    let allowed = access
        .permission_for(&module_key)
        .is_some_and(|p| p.flags.allows(action));

    Ok(Json(DataResponse {
        data: PermissionCheck {
            employee_id: params.employee_id,
            module_key,
            action,
            allowed,
        },
    }))
}

/// GET /api/v1/permissions/{role_id}/{module_id}
pub async fn get_pair(
    State(state): State<AppState>,
    Path((role_id, module_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<RoleModule>>> {
    let row = RoleModuleRepo::find(&state.pool, role_id, module_id)
        .await?
        .ok_or_else(|| pair_not_found(role_id, module_id))?;
    Ok(Json(DataResponse { data: row }))
}

/// PUT /api/v1/permissions/{role_id}/{module_id}
pub async fn update_pair(
    State(state): State<AppState>,
    Path((role_id, module_id)): Path<(DbId, DbId)>,
    AppJson(input): AppJson<UpdatePermission>,
) -> AppResult<Json<DataResponse<RoleModule>>> {
    let row = RoleModuleRepo::update(&state.pool, role_id, module_id, &input)
        .await?
        .ok_or_else(|| pair_not_found(role_id, module_id))?;
    Ok(Json(DataResponse { data: row }))
}

/// DELETE /api/v1/permissions/{role_id}/{module_id}
pub async fn delete_pair(
    State(state): State<AppState>,
    Path((role_id, module_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if RoleModuleRepo::delete(&state.pool, role_id, module_id).await? {
        tracing::info!(role_id, module_id, "Permission revoked");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(pair_not_found(role_id, module_id))
    }
}
