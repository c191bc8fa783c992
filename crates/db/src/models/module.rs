//! Module entity model and DTOs.

use primefire_core::module_tree::{TreeItem, TreeNode};
use primefire_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `modules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Module {
    pub id: DbId,
    pub name: String,
    pub key: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub route: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub parent_module_id: Option<DbId>,
    pub created_at: Timestamp,
}

impl TreeItem for Module {
    fn id(&self) -> DbId {
        self.id
    }

    fn parent_id(&self) -> Option<DbId> {
        self.parent_module_id
    }

    fn display_order(&self) -> i32 {
        self.display_order
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A module with its nested children.
pub type ModuleNode = TreeNode<Module>;

/// DTO for creating a module.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateModule {
    pub name: String,
    pub key: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub route: Option<String>,
    /// Defaults to 0.
    pub display_order: Option<i32>,
    /// Defaults to `true`.
    pub is_active: Option<bool>,
    pub parent_module_id: Option<DbId>,
}

/// DTO for updating a module. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateModule {
    pub name: Option<String>,
    pub key: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub route: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
    /// `Some(None)` (JSON `null`) clears the parent.
    #[serde(default, deserialize_with = "super::double_option")]
    pub parent_module_id: Option<Option<DbId>>,
}
