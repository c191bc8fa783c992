//! Ticket enumerations and field validation.
//!
//! The database stores each enumeration as `TEXT` guarded by a `CHECK`
//! constraint rendered from the same `ALL` lists defined here.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Maximum ticket title length in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum ticket description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 2000;

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $( $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( #[serde(rename = $val)] $variant ),+
        }

        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// The value stored in the database.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }

            /// Every accepted value as stored in the database.
            pub fn values() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| {
                        CoreError::Validation(format!(
                            "Invalid {} '{s}'. Must be one of: {}",
                            $label,
                            Self::values().join(", ")
                        ))
                    })
            }
        }
    };
}

define_text_enum! {
    /// Ticket lifecycle status.
    TicketStatus ("status") {
        Todo = "todo",
        Active = "active",
        Inactive = "inactive",
        Closed = "closed",
        Done = "done",
        InProgress = "in_progress",
        OnHold = "on_hold",
    }
}

define_text_enum! {
    /// Ticket priority.
    TicketPriority ("priority") {
        Low = "low",
        Normal = "normal",
        Medium = "medium",
        High = "high",
        Urgent = "urgent",
    }
}

define_text_enum! {
    /// Service level class of a ticket.
    TicketSla ("SLA") {
        Hours12 = "12h",
        Hours24 = "24h",
        Hours48 = "48h",
        Weeks1 = "1w",
        Weeks2 = "2w",
        Weeks4 = "4w",
    }
}

impl Default for TicketStatus {
    fn default() -> Self {
        TicketStatus::Todo
    }
}

impl Default for TicketPriority {
    fn default() -> Self {
        TicketPriority::Normal
    }
}

impl TicketSla {
    /// Length of the service window.
    pub fn duration(self) -> Duration {
        match self {
            TicketSla::Hours12 => Duration::hours(12),
            TicketSla::Hours24 => Duration::hours(24),
            TicketSla::Hours48 => Duration::hours(48),
            TicketSla::Weeks1 => Duration::weeks(1),
            TicketSla::Weeks2 => Duration::weeks(2),
            TicketSla::Weeks4 => Duration::weeks(4),
        }
    }

    /// When a ticket opened at `created_at` falls out of its SLA.
    pub fn due_at(self, created_at: Timestamp) -> Timestamp {
        created_at + self.duration()
    }
}

/// Validate a ticket title: non-blank, at most [`MAX_TITLE_LEN`] characters.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Ticket title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Ticket title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an optional ticket description length.
pub fn validate_description(description: Option<&str>) -> Result<(), CoreError> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => Err(CoreError::Validation(
            format!("Ticket description must be at most {MAX_DESCRIPTION_LEN} characters"),
        )),
        _ => Ok(()),
    }
}
