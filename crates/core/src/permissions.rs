//! Capability model behind the role/module permission matrix.
//!
//! A `role_modules` row carries one boolean per [`Capability`]. An employee
//! holding several roles gets the logical OR of every row that targets the
//! same module.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One permission dimension on a `role_modules` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    View,
    Create,
    Edit,
    Delete,
    Export,
    Admin,
    Other,
}

impl Capability {
    /// Every capability, in column order.
    pub const ALL: [Capability; 7] = [
        Capability::View,
        Capability::Create,
        Capability::Edit,
        Capability::Delete,
        Capability::Export,
        Capability::Admin,
        Capability::Other,
    ];

    /// Lowercase action name as accepted by the permission check endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::View => "view",
            Capability::Create => "create",
            Capability::Edit => "edit",
            Capability::Delete => "delete",
            Capability::Export => "export",
            Capability::Admin => "admin",
            Capability::Other => "other",
        }
    }

    /// The `role_modules` column holding this capability.
    pub fn column(self) -> &'static str {
        match self {
            Capability::View => "can_view",
            Capability::Create => "can_create",
            Capability::Edit => "can_edit",
            Capability::Delete => "can_delete",
            Capability::Export => "can_export",
            Capability::Admin => "admin_actions",
            Capability::Other => "other_actions",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| {
                let valid: Vec<&str> = Capability::ALL.iter().map(|c| c.as_str()).collect();
                CoreError::Validation(format!(
                    "Invalid action '{s}'. Must be one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

/// The seven capability flags of one role/module pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityFlags {
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_export: bool,
    pub admin_actions: bool,
    pub other_actions: bool,
}

impl CapabilityFlags {
    /// No capability granted.
    pub const fn none() -> Self {
        Self {
            can_view: false,
            can_create: false,
            can_edit: false,
            can_delete: false,
            can_export: false,
            admin_actions: false,
            other_actions: false,
        }
    }

    /// Every capability granted.
    pub const fn all() -> Self {
        Self {
            can_view: true,
            can_create: true,
            can_edit: true,
            can_delete: true,
            can_export: true,
            admin_actions: true,
            other_actions: true,
        }
    }

    /// Only `view` granted.
    pub const fn view_only() -> Self {
        Self {
            can_view: true,
            ..Self::none()
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::View => self.can_view,
            Capability::Create => self.can_create,
            Capability::Edit => self.can_edit,
            Capability::Delete => self.can_delete,
            Capability::Export => self.can_export,
            Capability::Admin => self.admin_actions,
            Capability::Other => self.other_actions,
        }
    }

    /// Combine two grants for the same module (logical OR per flag).
    pub fn merge(&self, other: &CapabilityFlags) -> CapabilityFlags {
        CapabilityFlags {
            can_view: self.can_view || other.can_view,
            can_create: self.can_create || other.can_create,
            can_edit: self.can_edit || other.can_edit,
            can_delete: self.can_delete || other.can_delete,
            can_export: self.can_export || other.can_export,
            admin_actions: self.admin_actions || other.admin_actions,
            other_actions: self.other_actions || other.other_actions,
        }
    }

    pub fn is_empty(&self) -> bool {
        Capability::ALL.iter().all(|c| !self.allows(*c))
    }

    /// Capabilities that are granted, in column order.
    pub fn granted(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.allows(*c))
            .collect()
    }
}
