//! Handlers for the `/tickets` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use primefire_core::error::CoreError;
use primefire_core::types::DbId;
use primefire_db::models::ticket::{
    CreateTicket, Ticket, TicketAssignment, TicketFilter, TicketStatusChange, UpdateTicket,
};
use primefire_db::repositories::TicketRepo;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Ticket",
        id,
    })
}

/// GET /api/v1/tickets
///
/// Newest first. Accepts `status`, `priority`, `sla`, `assigned_to`,
/// `created_by` and `search` query filters.
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<TicketFilter>,
) -> AppResult<Json<DataResponse<Vec<Ticket>>>> {
    let tickets = TicketRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: tickets }))
}

/// POST /api/v1/tickets
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateTicket>,
) -> AppResult<(StatusCode, Json<DataResponse<Ticket>>)> {
    let ticket = TicketRepo::create(&state.pool, &input).await?;
    tracing::info!(ticket_id = ticket.id, created_by = ticket.created_by, "Ticket opened");
    Ok((StatusCode::CREATED, Json(DataResponse { data: ticket })))
}

/// GET /api/v1/tickets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    let ticket = TicketRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: ticket }))
}

/// PUT /api/v1/tickets/{id}
///
/// Partial update; `null` clears `description`, `sla` or `assigned_to`.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateTicket>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    let ticket = TicketRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: ticket }))
}

/// PATCH /api/v1/tickets/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<TicketStatusChange>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    let ticket = TicketRepo::set_status(&state.pool, id, input.status)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(ticket_id = id, status = %input.status, "Ticket status changed");
    Ok(Json(DataResponse { data: ticket }))
}

/// PATCH /api/v1/tickets/{id}/assignee
pub async fn assign(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<TicketAssignment>,
) -> AppResult<Json<DataResponse<Ticket>>> {
    let ticket = TicketRepo::assign(&state.pool, id, input.assigned_to)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(ticket_id = id, assigned_to = ?input.assigned_to, "Ticket assignee changed");
    Ok(Json(DataResponse { data: ticket }))
}

/// DELETE /api/v1/tickets/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if TicketRepo::delete(&state.pool, id).await? {
        tracing::info!(ticket_id = id, "Ticket deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
