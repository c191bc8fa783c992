//! Handlers for employees, their role assignments and their effective access.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use primefire_core::error::CoreError;
use primefire_core::types::DbId;
use primefire_db::models::employee::{CreateEmployee, Employee, UpdateEmployee};
use primefire_db::models::role::Role;
use primefire_db::models::role_module::EmployeeAccess;
use primefire_db::repositories::{EmployeeRepo, RoleModuleRepo, RoleRepo};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Employee",
        id,
    })
}

async fn ensure_exists(state: &AppState, id: DbId) -> AppResult<Employee> {
    EmployeeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

fn require_non_empty(fields: &[(&str, Option<&String>)]) -> AppResult<()> {
    for &(field, value) in fields {
        if value.is_some_and(|v| v.trim().is_empty()) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "{field} must not be empty"
            ))));
        }
    }
    Ok(())
}

/// GET /api/v1/employees
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Employee>>>> {
    let employees = EmployeeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: employees }))
}

/// POST /api/v1/employees
///
/// Emails are unique; a duplicate returns 409.
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateEmployee>,
) -> AppResult<(StatusCode, Json<DataResponse<Employee>>)> {
    require_non_empty(&[
        ("first_name", Some(&input.first_name)),
        ("last_name", Some(&input.last_name)),
        ("email", Some(&input.email)),
    ])?;
    let employee = EmployeeRepo::create(&state.pool, &input).await?;
    tracing::info!(employee_id = employee.id, "Employee created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: employee })))
}

/// GET /api/v1/employees/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Employee>>> {
    let employee = ensure_exists(&state, id).await?;
    Ok(Json(DataResponse { data: employee }))
}

/// PUT /api/v1/employees/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateEmployee>,
) -> AppResult<Json<DataResponse<Employee>>> {
    require_non_empty(&[
        ("first_name", input.first_name.as_ref()),
        ("last_name", input.last_name.as_ref()),
        ("email", input.email.as_ref()),
    ])?;
    let employee = EmployeeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: employee }))
}

/// DELETE /api/v1/employees/{id}
///
/// Role assignments go with the employee. Returns 409 while tickets still
/// reference them.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if EmployeeRepo::delete(&state.pool, id).await? {
        tracing::info!(employee_id = id, "Employee deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/employees/{id}/roles
pub async fn roles(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Role>>>> {
    ensure_exists(&state, id).await?;
    let roles = EmployeeRepo::roles_for(&state.pool, id).await?;
    Ok(Json(DataResponse { data: roles }))
}

/// POST /api/v1/employees/{id}/roles/{role_id}
///
/// Idempotent. Returns 201 when the role was newly granted and 200 when the
/// employee already held it.
pub async fn assign_role(
    State(state): State<AppState>,
    Path((id, role_id)): Path<(DbId, DbId)>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<Role>>>)> {
    ensure_exists(&state, id).await?;
    RoleRepo::find_by_id(&state.pool, role_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Role",
            id: role_id,
        }))?;

    let granted = EmployeeRepo::assign_role(&state.pool, id, role_id).await?;
    if granted {
        tracing::info!(employee_id = id, role_id, "Role assigned");
    }
    let roles = EmployeeRepo::roles_for(&state.pool, id).await?;
    let status = if granted {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DataResponse { data: roles })))
}

/// DELETE /api/v1/employees/{id}/roles/{role_id}
///
/// Returns 404 when the employee does not hold the role.
pub async fn revoke_role(
    State(state): State<AppState>,
    Path((id, role_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if EmployeeRepo::revoke_role(&state.pool, id, role_id).await? {
        tracing::info!(employee_id = id, role_id, "Role revoked");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Role assignment",
            id: role_id,
        }))
    }
}

/// GET /api/v1/employees/{id}/permissions
///
/// Effective access of one employee: every active module reachable through
/// any of their roles, with the flags of all those roles OR-ed together.
pub async fn effective_permissions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EmployeeAccess>>> {
    ensure_exists(&state, id).await?;
    let access = RoleModuleRepo::effective_for_employee(&state.pool, id).await?;
    Ok(Json(DataResponse { data: access }))
}
