//! Employee entity model.

use primefire_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `employees` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Employee {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub display_name: Option<String>,
    pub email: String,
    pub title: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an employee.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmployee {
    pub first_name: String,
    pub last_name: String,
    pub display_name: Option<String>,
    pub email: String,
    pub title: Option<String>,
}

/// DTO for updating an employee. All fields are optional; `null` clears
/// `display_name` or `title`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub display_name: Option<Option<String>>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub title: Option<Option<String>>,
    pub is_active: Option<bool>,
}
