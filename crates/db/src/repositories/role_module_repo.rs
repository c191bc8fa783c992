//! Repository for the `role_modules` permission matrix.

use std::collections::HashMap;

use primefire_core::permissions::CapabilityFlags;
use primefire_core::types::DbId;
use sqlx::{FromRow, PgPool};

use crate::models::role_module::{
    BulkPermissionUpdate, CreatePermission, EffectivePermission, EmployeeAccess,
    PermissionDetail, RoleModule, UpdatePermission,
};
use crate::repositories::EmployeeRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "role_id, module_id, can_view, can_create, can_edit, can_delete, \
                       can_export, admin_actions, other_actions, assigned_at";

const DETAIL_SELECT: &str = "SELECT rm.role_id, r.name AS role_name, rm.module_id, \
        m.name AS module_name, m.key AS module_key, rm.can_view, rm.can_create, \
        rm.can_edit, rm.can_delete, rm.can_export, rm.admin_actions, rm.other_actions, \
        rm.assigned_at \
     FROM role_modules rm \
     JOIN roles r ON r.id = rm.role_id \
     JOIN modules m ON m.id = rm.module_id";

const DETAIL_ORDER: &str = "ORDER BY r.name ASC, m.display_order ASC, m.name ASC";

/// One role's grant on one module, joined for the effective-access merge.
#[derive(Debug, FromRow)]
struct GrantRow {
    module_id: DbId,
    module_key: String,
    module_name: String,
    route: Option<String>,
    can_view: bool,
    can_create: bool,
    can_edit: bool,
    can_delete: bool,
    can_export: bool,
    admin_actions: bool,
    other_actions: bool,
}

impl GrantRow {
    fn flags(&self) -> CapabilityFlags {
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

/// Provides CRUD operations and access evaluation for the permission matrix.
pub struct RoleModuleRepo;

impl RoleModuleRepo {
    /// Grant a role access to a module.
    ///
    /// Fails with a unique violation if the pair already exists and with a
    /// foreign key violation if the role or module does not.
    pub async fn create(pool: &PgPool, input: &CreatePermission) -> Result<RoleModule, sqlx::Error> {
        let flags = input.grant.flags();
        let query = format!(
            "INSERT INTO role_modules
                (role_id, module_id, can_view, can_create, can_edit, can_delete, can_export,
                 admin_actions, other_actions)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RoleModule>(&query)
            .bind(input.role_id)
            .bind(input.grant.module_id)
            .bind(flags.can_view)
            .bind(flags.can_create)
            .bind(flags.can_edit)
            .bind(flags.can_delete)
            .bind(flags.can_export)
            .bind(flags.admin_actions)
            .bind(flags.other_actions)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        role_id: DbId,
        module_id: DbId,
    ) -> Result<Option<RoleModule>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM role_modules WHERE role_id = $1 AND module_id = $2");
        sqlx::query_as::<_, RoleModule>(&query)
            .bind(role_id)
            .bind(module_id)
            .fetch_optional(pool)
            .await
    }

    /// Every row with role and module names, ordered by role name, then
    /// module display order.
    pub async fn list_detailed(pool: &PgPool) -> Result<Vec<PermissionDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} {DETAIL_ORDER}");
        sqlx::query_as::<_, PermissionDetail>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_role(
        pool: &PgPool,
        role_id: DbId,
    ) -> Result<Vec<PermissionDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE rm.role_id = $1 {DETAIL_ORDER}");
        sqlx::query_as::<_, PermissionDetail>(&query)
            .bind(role_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_module(
        pool: &PgPool,
        module_id: DbId,
    ) -> Result<Vec<PermissionDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE rm.module_id = $1 {DETAIL_ORDER}");
        sqlx::query_as::<_, PermissionDetail>(&query)
            .bind(module_id)
            .fetch_all(pool)
            .await
    }

    /// Update flags on one row. Only non-`None` fields are applied.
    ///
    /// Returns `None` if the pair does not exist.
    pub async fn update(
        pool: &PgPool,
        role_id: DbId,
        module_id: DbId,
        input: &UpdatePermission,
    ) -> Result<Option<RoleModule>, sqlx::Error> {
        let query = format!(
            "UPDATE role_modules SET
                can_view = COALESCE($3, can_view),
                can_create = COALESCE($4, can_create),
                can_edit = COALESCE($5, can_edit),
                can_delete = COALESCE($6, can_delete),
                can_export = COALESCE($7, can_export),
                admin_actions = COALESCE($8, admin_actions),
                other_actions = COALESCE($9, other_actions)
             WHERE role_id = $1 AND module_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RoleModule>(&query)
            .bind(role_id)
            .bind(module_id)
            .bind(input.can_view)
            .bind(input.can_create)
            .bind(input.can_edit)
            .bind(input.can_delete)
            .bind(input.can_export)
            .bind(input.admin_actions)
            .bind(input.other_actions)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, role_id: DbId, module_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM role_modules WHERE role_id = $1 AND module_id = $2")
            .bind(role_id)
            .bind(module_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace every row of a role within a transaction.
    ///
    /// A grant naming a missing module fails the insert and the whole
    /// replacement rolls back, leaving the previous matrix intact.
    pub async fn replace_for_role(
        pool: &PgPool,
        input: &BulkPermissionUpdate,
    ) -> Result<Vec<RoleModule>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM role_modules WHERE role_id = $1")
            .bind(input.role_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO role_modules
                (role_id, module_id, can_view, can_create, can_edit, can_delete, can_export,
                 admin_actions, other_actions)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let mut rows = Vec::with_capacity(input.permissions.len());
        for grant in &input.permissions {
            let flags = grant.flags();
            let row = sqlx::query_as::<_, RoleModule>(&query)
                .bind(input.role_id)
                .bind(grant.module_id)
                .bind(flags.can_view)
                .bind(flags.can_create)
                .bind(flags.can_edit)
                .bind(flags.can_delete)
                .bind(flags.can_export)
                .bind(flags.admin_actions)
                .bind(flags.other_actions)
                .fetch_one(&mut *tx)
                .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok(rows)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM role_modules")
            .fetch_one(pool)
            .await
    }

    /// Effective access of an employee: for each active module reachable
    /// through any of their roles, the OR of every role's flags.
    pub async fn effective_for_employee(
        pool: &PgPool,
        employee_id: DbId,
    ) -> Result<EmployeeAccess, sqlx::Error> {
        let roles = EmployeeRepo::roles_for(pool, employee_id).await?;

        let grants = sqlx::query_as::<_, GrantRow>(
            "SELECT m.id AS module_id, m.key AS module_key, m.name AS module_name, m.route,
                    rm.can_view, rm.can_create, rm.can_edit, rm.can_delete, rm.can_export,
                    rm.admin_actions, rm.other_actions
             FROM employee_roles er
             JOIN role_modules rm ON rm.role_id = er.role_id
             JOIN modules m ON m.id = rm.module_id
             WHERE er.employee_id = $1 AND m.is_active
             ORDER BY m.display_order ASC, m.name ASC, er.role_id ASC",
        )
        .bind(employee_id)
        .fetch_all(pool)
        .await?;

        Ok(EmployeeAccess {
            employee_id,
            roles: roles.into_iter().map(|r| r.name).collect(),
            ..merge_grants(employee_id, grants)
        })
    }
}

fn merge_grants(employee_id: DbId, grants: Vec<GrantRow>) -> EmployeeAccess {
    let mut permissions: Vec<EffectivePermission> = Vec::new();
    let mut index: HashMap<DbId, usize> = HashMap::new();
    for grant in grants {
        let flags = grant.flags();
        match index.get(&grant.module_id) {
            Some(&i) => permissions[i].flags = permissions[i].flags.merge(&flags),
            None => {
                index.insert(grant.module_id, permissions.len());
                permissions.push(EffectivePermission {
                    module_id: grant.module_id,
                    module_key: grant.module_key,
                    module_name: grant.module_name,
                    route: grant.route,
                    flags,
                });
            }
        }
    }

    let accessible_modules = permissions
        .iter()
        .filter(|p| p.flags.can_view)
        .map(|p| p.module_key.clone())
        .collect();

    EmployeeAccess {
        employee_id,
        roles: Vec::new(),
        permissions,
        accessible_modules,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(module_id: DbId, key: &str, flags: CapabilityFlags) -> GrantRow {
        GrantRow {
            module_id,
            module_key: key.to_string(),
            module_name: key.to_string(),
            route: None,
            can_view: flags.can_view,
            can_create: flags.can_create,
            can_edit: flags.can_edit,
            can_delete: flags.can_delete,
            can_export: flags.can_export,
            admin_actions: flags.admin_actions,
            other_actions: flags.other_actions,
        }
    }

    #[test]
    fn grants_from_several_roles_are_ored() {
        let export_only = CapabilityFlags {
            can_export: true,
            ..CapabilityFlags::none()
        };
        let access = merge_grants(
            7,
            vec![
                row(1, "dashboard", CapabilityFlags::view_only()),
                row(1, "dashboard", export_only),
                row(2, "jobs", CapabilityFlags::none()),
            ],
        );

        assert_eq!(access.permissions.len(), 2);
        let dashboard = access.permission_for("dashboard").unwrap();
        assert!(dashboard.flags.can_view && dashboard.flags.can_export);
        assert!(!dashboard.flags.can_delete);
        assert_eq!(access.accessible_modules, vec!["dashboard".to_string()]);
    }

    #[test]
    fn no_grants_means_no_access() {
        let access = merge_grants(7, Vec::new());
        assert!(access.permissions.is_empty());
        assert!(access.accessible_modules.is_empty());
    }
}
