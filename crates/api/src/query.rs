//! Shared query parameter types for API handlers.

use primefire_core::types::DbId;
use serde::Deserialize;

/// Query parameters for list endpoints that support an `include_inactive` flag.
#[derive(Debug, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}

/// `?employee_id=` for the permission check endpoint.
#[derive(Debug, Deserialize)]
pub struct EmployeeParams {
    pub employee_id: DbId,
}
