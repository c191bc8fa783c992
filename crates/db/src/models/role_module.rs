//! Permission matrix rows and DTOs.

use primefire_core::permissions::CapabilityFlags;
use primefire_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `role_modules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoleModule {
    pub role_id: DbId,
    pub module_id: DbId,
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_export: bool,
    pub admin_actions: bool,
    pub other_actions: bool,
    pub assigned_at: Timestamp,
}

impl RoleModule {
    pub fn flags(&self) -> CapabilityFlags {
        CapabilityFlags {
            can_view: self.can_view,
            can_create: self.can_create,
            can_edit: self.can_edit,
            can_delete: self.can_delete,
            can_export: self.can_export,
            admin_actions: self.admin_actions,
            other_actions: self.other_actions,
        }
    }
}

/// A `role_modules` row joined with the role and module it links.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PermissionDetail {
    pub role_id: DbId,
    pub role_name: String,
    pub module_id: DbId,
    pub module_name: String,
    pub module_key: String,
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_export: bool,
    pub admin_actions: bool,
    pub other_actions: bool,
    pub assigned_at: Timestamp,
}

/// Every permission row of one role.
#[derive(Debug, Clone, Serialize)]
pub struct RolePermissions {
    pub role_id: DbId,
    pub role_name: String,
    pub permissions: Vec<PermissionDetail>,
}

fn default_true() -> bool {
    true
}

/// Flags for one module. `can_view` defaults to `true`, every other flag to
/// `false`, matching the column defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleGrant {
    pub module_id: DbId,
    #[serde(default = "default_true")]
    pub can_view: bool,
    #[serde(default)]
    pub can_create: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
    #[serde(default)]
    pub can_export: bool,
    #[serde(default)]
    pub admin_actions: bool,
    #[serde(default)]
    pub other_actions: bool,
}

impl ModuleGrant {
    pub fn flags(&self) -> CapabilityFlags {
        CapabilityFlags {
            can_view: self.can_view,
            can_create: self.can_create,
            can_edit: self.can_edit,
            can_delete: self.can_delete,
            can_export: self.can_export,
            admin_actions: self.admin_actions,
            other_actions: self.other_actions,
        }
    }
}

/// DTO for granting a role access to one module.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePermission {
    pub role_id: DbId,
    #[serde(flatten)]
    pub grant: ModuleGrant,
}

/// DTO for changing flags on an existing row. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePermission {
    pub can_view: Option<bool>,
    pub can_create: Option<bool>,
    pub can_edit: Option<bool>,
    pub can_delete: Option<bool>,
    pub can_export: Option<bool>,
    pub admin_actions: Option<bool>,
    pub other_actions: Option<bool>,
}

/// Replace every permission row of a role.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkPermissionUpdate {
    pub role_id: DbId,
    pub permissions: Vec<ModuleGrant>,
}

/// Merged capabilities of one employee on one module.
#[derive(Debug, Clone, Serialize)]
pub struct EffectivePermission {
    pub module_id: DbId,
    pub module_key: String,
    pub module_name: String,
    pub route: Option<String>,
    #[serde(flatten)]
    pub flags: CapabilityFlags,
}

/// Everything an employee may do, across all of their roles.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeAccess {
    pub employee_id: DbId,
    pub roles: Vec<String>,
    pub permissions: Vec<EffectivePermission>,
    /// Keys of the modules the employee can view.
    pub accessible_modules: Vec<String>,
}

impl EmployeeAccess {
    pub fn permission_for(&self, module_key: &str) -> Option<&EffectivePermission> {
        self.permissions.iter().find(|p| p.module_key == module_key)
    }
}
