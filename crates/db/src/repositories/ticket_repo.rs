//! Repository for the `tickets` table.

use primefire_core::tickets::{validate_description, validate_title, TicketStatus};
use primefire_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::ticket::{CreateTicket, Ticket, TicketFilter, UpdateTicket};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, status, priority, sla, created_by, assigned_to, \
                       created_at, updated_at";

/// Provides CRUD operations for tickets.
pub struct TicketRepo;

impl TicketRepo {
    /// Open a ticket. Status defaults to `todo` and priority to `normal`.
    pub async fn create(pool: &PgPool, input: &CreateTicket) -> Result<Ticket, DbError> {
        validate_title(&input.title)?;
        validate_description(input.description.as_deref())?;

        let query = format!(
            "INSERT INTO tickets (title, description, status, priority, sla, created_by, assigned_to)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status.unwrap_or_default().as_str())
            .bind(input.priority.unwrap_or_default().as_str())
            .bind(input.sla.map(|s| s.as_str()))
            .bind(input.created_by)
            .bind(input.assigned_to)
            .fetch_one(pool)
            .await?;
        Ok(ticket)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tickets matching every given filter, newest first.
    pub async fn list(pool: &PgPool, filter: &TicketFilter) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::TEXT IS NULL OR priority = $2)
               AND ($3::TEXT IS NULL OR sla = $3)
               AND ($4::BIGINT IS NULL OR assigned_to = $4)
               AND ($5::BIGINT IS NULL OR created_by = $5)
               AND ($6::TEXT IS NULL
                    OR title ILIKE '%' || $6 || '%'
                    OR description ILIKE '%' || $6 || '%')
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.priority.map(|p| p.as_str()))
            .bind(filter.sla.map(|s| s.as_str()))
            .bind(filter.assigned_to)
            .bind(filter.created_by)
            .bind(filter.search.as_deref())
            .fetch_all(pool)
            .await
    }

    /// Update a ticket. Only non-`None` fields in `input` are applied and
    /// `updated_at` is bumped. `Some(None)` clears a nullable column.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTicket,
    ) -> Result<Option<Ticket>, DbError> {
        if let Some(title) = &input.title {
            validate_title(title)?;
        }
        validate_description(input.description.as_ref().and_then(Option::as_deref))?;

        let query = format!(
            "UPDATE tickets SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                status = COALESCE($5, status),
                priority = COALESCE($6, priority),
                sla = CASE WHEN $7 THEN $8 ELSE sla END,
                assigned_to = CASE WHEN $9 THEN $10 ELSE assigned_to END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(Option::as_deref))
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.priority.map(|p| p.as_str()))
            .bind(input.sla.is_some())
            .bind(input.sla.flatten().map(|s| s.as_str()))
            .bind(input.assigned_to.is_some())
            .bind(input.assigned_to.flatten())
            .fetch_optional(pool)
            .await?;
        Ok(ticket)
    }

    /// Move a ticket to `status`.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: TicketStatus,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the assignee.
    pub async fn assign(
        pool: &PgPool,
        id: DbId,
        assignee: Option<DbId>,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET assigned_to = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(assignee)
            .fetch_optional(pool)
            .await
    }

    /// Delete a ticket. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
