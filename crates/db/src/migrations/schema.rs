//! The standard migration plan.
//!
//! Tables are created with their columns and primary key only; every other
//! constraint and index is its own step so a table left behind by an older
//! deployment still converges on the full shape.

use primefire_core::module_tree::{MAX_KEY_LEN, MAX_NAME_LEN};
use primefire_core::tickets::{
    TicketPriority, TicketSla, TicketStatus, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN,
};

use super::step::{in_list_check, FkAction, Step};
use super::Migration;
use crate::seed::SeedTarget;

/// Maximum module description length in characters.
pub const MAX_MODULE_DESCRIPTION_LEN: usize = 200;

pub const CREATE_REFERENCE_TABLES: &str = "20250301000001_create_reference_tables";
pub const CREATE_MODULES: &str = "20250301000002_create_modules";
pub const CREATE_ROLE_MODULES: &str = "20250301000003_create_role_modules";
pub const CREATE_TICKETS: &str = "20250301000004_create_tickets";
pub const SEED_DEFAULT_ACCESS: &str = "20250301000005_seed_default_access";
pub const ADD_ROLE_MODULE_ACTION_FLAGS: &str = "20250302000001_add_role_module_action_flags";

/// Every migration, oldest first.
pub fn standard_plan() -> Vec<Migration> {
    vec![
        reference_tables(),
        modules(),
        role_modules(),
        tickets(),
        seed_default_access(),
        role_module_action_flags(),
    ]
}

/// Roles and employees are owned by the wider administration system; they
/// are only created here when missing so the permission tables have
/// something to reference.
fn reference_tables() -> Migration {
    Migration {
        id: CREATE_REFERENCE_TABLES,
        description: "Create roles, employees and employee_roles",
        steps: vec![
            Step::create_table(
                "roles",
                &[
                    "id BIGSERIAL PRIMARY KEY",
                    "name TEXT NOT NULL",
                    "description TEXT",
                    "created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
                ],
            ),
            Step::unique("roles", "uq_roles_name", &["name"]),
            Step::create_table(
                "employees",
                &[
                    "id BIGSERIAL PRIMARY KEY",
                    "first_name TEXT NOT NULL",
                    "last_name TEXT NOT NULL",
                    "display_name TEXT",
                    "email TEXT NOT NULL",
                    "title TEXT",
                    "is_active BOOLEAN NOT NULL DEFAULT TRUE",
                    "created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
                    "updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
                ],
            ),
            Step::unique("employees", "uq_employees_email", &["email"]),
            Step::create_table(
                "employee_roles",
                &[
                    "employee_id BIGINT NOT NULL",
                    "role_id BIGINT NOT NULL",
                    "assigned_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
                    "PRIMARY KEY (employee_id, role_id)",
                ],
            ),
            Step::foreign_key(
                "employee_roles",
                "fk_employee_roles_employee_id",
                "employee_id",
                "employees",
                FkAction::Cascade,
                FkAction::Cascade,
            ),
            Step::foreign_key(
                "employee_roles",
                "fk_employee_roles_role_id",
                "role_id",
                "roles",
                FkAction::Cascade,
                FkAction::Cascade,
            ),
            Step::index("idx_employee_roles_role_id", "employee_roles", &["role_id"]),
        ],
    }
}

fn modules() -> Migration {
    Migration {
        id: CREATE_MODULES,
        description: "Create the module hierarchy table",
        steps: vec![
            Step::create_table(
                "modules",
                &[
                    "id BIGSERIAL PRIMARY KEY",
                    "name TEXT NOT NULL",
                    "key TEXT NOT NULL",
                    "description TEXT",
                    "icon TEXT",
                    "route TEXT",
                    "display_order INTEGER NOT NULL DEFAULT 0",
                    "is_active BOOLEAN NOT NULL DEFAULT TRUE",
                    "parent_module_id BIGINT",
                    "created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
                ],
            ),
            Step::unique("modules", "uq_modules_key", &["key"]),
            Step::check(
                "modules",
                "ck_modules_name",
                format!("char_length(name) BETWEEN 1 AND {MAX_NAME_LEN}"),
            ),
            Step::check(
                "modules",
                "ck_modules_key",
                format!("char_length(key) BETWEEN 1 AND {MAX_KEY_LEN}"),
            ),
            Step::check(
                "modules",
                "ck_modules_description",
                format!(
                    "description IS NULL OR char_length(description) <= {MAX_MODULE_DESCRIPTION_LEN}"
                ),
            ),
            Step::check(
                "modules",
                "ck_modules_parent_module_id",
                "parent_module_id IS NULL OR parent_module_id <> id",
            ),
            Step::foreign_key(
                "modules",
                "fk_modules_parent_module_id",
                "parent_module_id",
                "modules",
                FkAction::Restrict,
                FkAction::Cascade,
            ),
            Step::index("idx_modules_parent_module_id", "modules", &["parent_module_id"]),
        ],
    }
}

fn role_modules() -> Migration {
    Migration {
        id: CREATE_ROLE_MODULES,
        description: "Create the role/module permission matrix",
        steps: vec![
            Step::create_table(
                "role_modules",
                &[
                    "role_id BIGINT NOT NULL",
                    "module_id BIGINT NOT NULL",
                    "can_view BOOLEAN NOT NULL DEFAULT TRUE",
                    "can_create BOOLEAN NOT NULL DEFAULT FALSE",
                    "can_edit BOOLEAN NOT NULL DEFAULT FALSE",
                    "can_delete BOOLEAN NOT NULL DEFAULT FALSE",
                    "can_export BOOLEAN NOT NULL DEFAULT FALSE",
                    "assigned_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
                    "PRIMARY KEY (role_id, module_id)",
                ],
            ),
            Step::foreign_key(
                "role_modules",
                "fk_role_modules_role_id",
                "role_id",
                "roles",
                FkAction::Cascade,
                FkAction::Cascade,
            ),
            Step::foreign_key(
                "role_modules",
                "fk_role_modules_module_id",
                "module_id",
                "modules",
                FkAction::Cascade,
                FkAction::Cascade,
            ),
            // role_id is the leading primary key column.
            Step::index("idx_role_modules_module_id", "role_modules", &["module_id"]),
        ],
    }
}

fn tickets() -> Migration {
    Migration {
        id: CREATE_TICKETS,
        description: "Create the tickets table",
        steps: vec![
            Step::create_table(
                "tickets",
                &[
                    "id BIGSERIAL PRIMARY KEY",
                    "title TEXT NOT NULL",
                    "description TEXT",
                    "status TEXT NOT NULL DEFAULT 'todo'",
                    "priority TEXT NOT NULL DEFAULT 'normal'",
                    "sla TEXT",
                    "created_by BIGINT NOT NULL",
                    "assigned_to BIGINT",
                    "created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
                    "updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
                ],
            ),
            Step::check(
                "tickets",
                "ck_tickets_status",
                in_list_check("status", &TicketStatus::values(), false),
            ),
            Step::check(
                "tickets",
                "ck_tickets_priority",
                in_list_check("priority", &TicketPriority::values(), false),
            ),
            Step::check(
                "tickets",
                "ck_tickets_sla",
                in_list_check("sla", &TicketSla::values(), true),
            ),
            Step::check(
                "tickets",
                "ck_tickets_title",
                format!("char_length(title) BETWEEN 1 AND {MAX_TITLE_LEN}"),
            ),
            Step::check(
                "tickets",
                "ck_tickets_description",
                format!("description IS NULL OR char_length(description) <= {MAX_DESCRIPTION_LEN}"),
            ),
            Step::foreign_key(
                "tickets",
                "fk_tickets_created_by",
                "created_by",
                "employees",
                FkAction::Restrict,
                FkAction::Cascade,
            ),
            Step::foreign_key(
                "tickets",
                "fk_tickets_assigned_to",
                "assigned_to",
                "employees",
                FkAction::Restrict,
                FkAction::Cascade,
            ),
            Step::index("idx_tickets_status", "tickets", &["status"]),
            Step::index("idx_tickets_priority", "tickets", &["priority"]),
            Step::index("idx_tickets_created_by", "tickets", &["created_by"]),
            Step::index("idx_tickets_assigned_to", "tickets", &["assigned_to"]),
            Step::index("idx_tickets_created_at", "tickets", &["created_at DESC"]),
            Step::index("idx_tickets_sla", "tickets", &["sla"]),
        ],
    }
}

fn seed_default_access() -> Migration {
    Migration {
        id: SEED_DEFAULT_ACCESS,
        description: "Seed built-in roles, modules and the default permission matrix",
        steps: SeedTarget::ALL.iter().copied().map(Step::Seed).collect(),
    }
}

fn role_module_action_flags() -> Migration {
    Migration {
        id: ADD_ROLE_MODULE_ACTION_FLAGS,
        description: "Add admin_actions and other_actions to role_modules",
        steps: vec![
            Step::add_column("role_modules", "admin_actions", "BOOLEAN", "FALSE"),
            Step::add_column("role_modules", "other_actions", "BOOLEAN", "FALSE"),
        ],
    }
}
