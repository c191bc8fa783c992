//! Reference data loader.
//!
//! Seeds the built-in roles, the module hierarchy and the default
//! permission matrix from [`DefaultAccess`]. Seeding is all-or-nothing per
//! table: a table that already holds any row is left untouched.

use std::fmt;

use primefire_core::seed::DefaultAccess;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::error::DbError;
use crate::migrations::catalog;

/// A table populated by the seed loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedTarget {
    Roles,
    Modules,
    RoleModules,
}

impl SeedTarget {
    /// Seed order: referenced tables first.
    pub const ALL: [SeedTarget; 3] = [SeedTarget::Roles, SeedTarget::Modules, SeedTarget::RoleModules];

    pub fn table(self) -> &'static str {
        match self {
            SeedTarget::Roles => "roles",
            SeedTarget::Modules => "modules",
            SeedTarget::RoleModules => "role_modules",
        }
    }
}

/// What [`seed_table`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted(u64),
    Skipped,
}

impl fmt::Display for SeedOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedOutcome::Inserted(n) => write!(f, "inserted {n} rows"),
            SeedOutcome::Skipped => f.write_str("skipped (table not empty)"),
        }
    }
}

/// Seed `target` unless it already holds rows.
pub async fn seed_table(
    conn: &mut PgConnection,
    target: SeedTarget,
    access: &DefaultAccess,
) -> Result<SeedOutcome, sqlx::Error> {
    if catalog::table_has_rows(&mut *conn, target.table()).await? {
        tracing::info!(table = target.table(), "Seed skipped, table not empty");
        return Ok(SeedOutcome::Skipped);
    }
    let rows = insert(conn, target, access).await?;
    tracing::info!(table = target.table(), rows, "Seeded table");
    Ok(SeedOutcome::Inserted(rows))
}

pub async fn seed_roles(
    conn: &mut PgConnection,
    access: &DefaultAccess,
) -> Result<SeedOutcome, sqlx::Error> {
    seed_table(conn, SeedTarget::Roles, access).await
}

pub async fn seed_modules(
    conn: &mut PgConnection,
    access: &DefaultAccess,
) -> Result<SeedOutcome, sqlx::Error> {
    seed_table(conn, SeedTarget::Modules, access).await
}

/// Roles and modules must be seeded first; every row references both.
pub async fn seed_role_modules(
    conn: &mut PgConnection,
    access: &DefaultAccess,
) -> Result<SeedOutcome, sqlx::Error> {
    seed_table(conn, SeedTarget::RoleModules, access).await
}

/// Seed every target, each in its own transaction.
pub async fn seed_all(pool: &PgPool) -> Result<Vec<(SeedTarget, SeedOutcome)>, DbError> {
    let access = DefaultAccess::load()?;
    let mut outcomes = Vec::with_capacity(SeedTarget::ALL.len());
    for target in SeedTarget::ALL {
        let mut tx = pool.begin().await?;
        let outcome = seed_table(&mut tx, target, &access).await?;
        tx.commit().await?;
        outcomes.push((target, outcome));
    }
    Ok(outcomes)
}

/// Insert every configured row of `target` without checking for existing
/// rows. Callers decide emptiness first.
pub(crate) async fn insert(
    conn: &mut PgConnection,
    target: SeedTarget,
    access: &DefaultAccess,
) -> Result<u64, sqlx::Error> {
    match target {
        SeedTarget::Roles => insert_roles(conn, access).await,
        SeedTarget::Modules => insert_modules(conn, access).await,
        SeedTarget::RoleModules => insert_role_modules(conn, access).await,
    }
}

async fn insert_roles(conn: &mut PgConnection, access: &DefaultAccess) -> Result<u64, sqlx::Error> {
    if access.roles.is_empty() {
        return Ok(0);
    }
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("INSERT INTO roles (id, name, description) ");
    qb.push_values(&access.roles, |mut row, role| {
        row.push_bind(role.id)
            .push_bind(role.name.clone())
            .push_bind(role.description.clone());
    });
    let rows = qb.build().execute(&mut *conn).await?.rows_affected();
    advance_id_sequence(conn, "roles").await?;
    Ok(rows)
}

async fn insert_modules(conn: &mut PgConnection, access: &DefaultAccess) -> Result<u64, sqlx::Error> {
    if access.modules.is_empty() {
        return Ok(0);
    }
    // `access.modules` is ordered parents-first.
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO modules \
            (id, name, key, description, icon, route, display_order, is_active, parent_module_id) ",
    );
    qb.push_values(&access.modules, |mut row, module| {
        row.push_bind(module.id)
            .push_bind(module.name.clone())
            .push_bind(module.key.clone())
            .push_bind(module.description.clone())
            .push_bind(module.icon.clone())
            .push_bind(module.route.clone())
            .push_bind(module.display_order)
            .push_bind(true)
            .push_bind(module.parent_module_id);
    });
    let rows = qb.build().execute(&mut *conn).await?.rows_affected();
    advance_id_sequence(conn, "modules").await?;
    Ok(rows)
}

async fn insert_role_modules(
    conn: &mut PgConnection,
    access: &DefaultAccess,
) -> Result<u64, sqlx::Error> {
    if access.grants.is_empty() {
        return Ok(0);
    }
    // On a schema that already carries the action columns, write them too so
    // every seeded flag is explicit.
    let with_actions = catalog::column_exists(&mut *conn, "role_modules", "admin_actions").await?
        && catalog::column_exists(&mut *conn, "role_modules", "other_actions").await?;

    let columns = if with_actions {
        "role_id, module_id, can_view, can_create, can_edit, can_delete, can_export, \
         admin_actions, other_actions"
    } else {
        "role_id, module_id, can_view, can_create, can_edit, can_delete, can_export"
    };
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("INSERT INTO role_modules ({columns}) "));
    qb.push_values(&access.grants, |mut row, grant| {
        row.push_bind(grant.role_id)
            .push_bind(grant.module_id)
            .push_bind(grant.flags.can_view)
            .push_bind(grant.flags.can_create)
            .push_bind(grant.flags.can_edit)
            .push_bind(grant.flags.can_delete)
            .push_bind(grant.flags.can_export);
        if with_actions {
            row.push_bind(grant.flags.admin_actions)
                .push_bind(grant.flags.other_actions);
        }
    });
    Ok(qb.build().execute(&mut *conn).await?.rows_affected())
}

/// Move the `id` sequence past the highest seeded id.
async fn advance_id_sequence(conn: &mut PgConnection, table: &str) -> Result<(), sqlx::Error> {
    let query = format!(
        "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
                       (SELECT COALESCE(MAX(id), 1) FROM {table}))"
    );
    sqlx::query(&query).execute(&mut *conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_order_puts_referenced_tables_first() {
        let tables: Vec<&str> = SeedTarget::ALL.iter().map(|t| t.table()).collect();
        assert_eq!(tables, vec!["roles", "modules", "role_modules"]);
    }

    #[test]
    fn outcome_display() {
        assert_eq!(SeedOutcome::Inserted(9).to_string(), "inserted 9 rows");
        assert_eq!(SeedOutcome::Skipped.to_string(), "skipped (table not empty)");
    }
}
