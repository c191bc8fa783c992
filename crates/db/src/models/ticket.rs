//! Ticket entity model and DTOs.

use primefire_core::tickets::{TicketPriority, TicketSla, TicketStatus};
use primefire_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tickets` table.
///
/// The enumeration columns are read as text; [`Ticket::status`] and friends
/// parse them into the domain types.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub sla: Option<String>,
    pub created_by: DbId,
    pub assigned_to: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ticket {
    pub fn status(&self) -> Option<TicketStatus> {
        self.status.parse().ok()
    }

    pub fn priority(&self) -> Option<TicketPriority> {
        self.priority.parse().ok()
    }

    pub fn sla(&self) -> Option<TicketSla> {
        self.sla.as_deref().and_then(|s| s.parse().ok())
    }

    /// When the ticket falls out of its SLA, if it has one.
    pub fn due_at(&self) -> Option<Timestamp> {
        self.sla().map(|sla| sla.due_at(self.created_at))
    }
}

/// DTO for opening a ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicket {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `todo`.
    pub status: Option<TicketStatus>,
    /// Defaults to `normal`.
    pub priority: Option<TicketPriority>,
    pub sla: Option<TicketSla>,
    pub created_by: DbId,
    pub assigned_to: Option<DbId>,
}

/// DTO for updating a ticket. All fields are optional.
///
/// The nullable columns take `Some(None)` (JSON `null`) to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTicket {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub sla: Option<Option<TicketSla>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub assigned_to: Option<Option<DbId>>,
}

/// Body of `PATCH /tickets/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketStatusChange {
    pub status: TicketStatus,
}

/// Body of `PATCH /tickets/{id}/assignee`. `null` unassigns.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketAssignment {
    pub assigned_to: Option<DbId>,
}

/// Optional filters for listing tickets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub sla: Option<TicketSla>,
    pub assigned_to: Option<DbId>,
    pub created_by: Option<DbId>,
    /// Case-insensitive match against title and description.
    pub search: Option<String>,
}
