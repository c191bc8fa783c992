//! Repository for the `modules` table.

use std::collections::HashMap;

use primefire_core::error::CoreError;
use primefire_core::module_tree::{
    build_forest, check_parent_assignment, validate_module_key, validate_module_name,
};
use primefire_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::DbError;
use crate::models::module::{CreateModule, Module, ModuleNode, UpdateModule};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, key, description, icon, route, display_order, is_active, \
                       parent_module_id, created_at";

/// Provides CRUD and hierarchy operations for modules.
pub struct ModuleRepo;

impl ModuleRepo {
    /// Insert a new module, returning the created row.
    ///
    /// The parent, if given, must exist. A new module has no descendants, so
    /// no cycle check is needed.
    pub async fn create(pool: &PgPool, input: &CreateModule) -> Result<Module, DbError> {
        validate_module_key(&input.key)?;
        validate_module_name(&input.name)?;

        if let Some(parent_id) = input.parent_module_id {
            if Self::find_by_id(pool, parent_id).await?.is_none() {
                return Err(CoreError::NotFound {
                    entity: "ParentModule",
                    id: parent_id,
                }
                .into());
            }
        }

        let query = format!(
            "INSERT INTO modules
                (name, key, description, icon, route, display_order, is_active, parent_module_id)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0), COALESCE($7, TRUE), $8)
             RETURNING {COLUMNS}"
        );
        let module = sqlx::query_as::<_, Module>(&query)
            .bind(&input.name)
            .bind(&input.key)
            .bind(&input.description)
            .bind(&input.icon)
            .bind(&input.route)
            .bind(input.display_order)
            .bind(input.is_active)
            .bind(input.parent_module_id)
            .fetch_one(pool)
            .await?;
        Ok(module)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Module>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM modules WHERE id = $1");
        sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_key(pool: &PgPool, key: &str) -> Result<Option<Module>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM modules WHERE key = $1");
        sqlx::query_as::<_, Module>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// List modules ordered by display order, then name.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Module>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM modules
             WHERE ($1 OR is_active)
             ORDER BY display_order ASC, name ASC"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Active modules without a parent.
    pub async fn list_roots(pool: &PgPool) -> Result<Vec<Module>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM modules
             WHERE parent_module_id IS NULL AND is_active
             ORDER BY display_order ASC, name ASC"
        );
        sqlx::query_as::<_, Module>(&query).fetch_all(pool).await
    }

    /// Active direct children of a module.
    pub async fn list_children(pool: &PgPool, parent_id: DbId) -> Result<Vec<Module>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM modules
             WHERE parent_module_id = $1 AND is_active
             ORDER BY display_order ASC, name ASC"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }

    /// The navigable module tree.
    ///
    /// When inactive modules are excluded, the active children of an inactive
    /// module are shown at the top level.
    pub async fn tree(pool: &PgPool, include_inactive: bool) -> Result<Vec<ModuleNode>, sqlx::Error> {
        let modules = Self::list(pool, include_inactive).await?;
        Ok(build_forest(modules))
    }

    /// Update a module. Only non-`None` fields in `input` are applied.
    /// `parent_module_id: Some(None)` moves the module back to the top level.
    ///
    /// A parent change walks the new parent's ancestor chain inside the same
    /// transaction as the write, with the hierarchy rows locked, and rejects
    /// the change if the chain reaches this module.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateModule,
    ) -> Result<Option<Module>, DbError> {
        if let Some(key) = &input.key {
            validate_module_key(key)?;
        }
        if let Some(name) = &input.name {
            validate_module_name(name)?;
        }

        let mut tx = pool.begin().await?;

        if let Some(Some(parent_id)) = input.parent_module_id {
            let parents = Self::lock_hierarchy(&mut tx).await?;
            if !parents.contains_key(&id) {
                return Ok(None);
            }
            check_parent_assignment(Some(id), parent_id, &parents)?;
        }

        let query = format!(
            "UPDATE modules SET
                name = COALESCE($2, name),
                key = COALESCE($3, key),
                description = COALESCE($4, description),
                icon = COALESCE($5, icon),
                route = COALESCE($6, route),
                display_order = COALESCE($7, display_order),
                is_active = COALESCE($8, is_active),
                parent_module_id = CASE WHEN $9 THEN $10 ELSE parent_module_id END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let module = sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.key)
            .bind(&input.description)
            .bind(&input.icon)
            .bind(&input.route)
            .bind(input.display_order)
            .bind(input.is_active)
            .bind(input.parent_module_id.is_some())
            .bind(input.parent_module_id.flatten())
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(module)
    }

    /// Flip the active flag. Returns `None` if the module does not exist.
    pub async fn toggle_active(pool: &PgPool, id: DbId) -> Result<Option<Module>, sqlx::Error> {
        let query = format!(
            "UPDATE modules SET is_active = NOT is_active WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a module and its permission rows.
    ///
    /// Refuses with `Conflict` while the module still has children. Returns
    /// `false` if no row with the given `id` exists.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let mut tx = pool.begin().await?;

        let children: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM modules WHERE parent_module_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if children > 0 {
            return Err(CoreError::Conflict(format!(
                "Module {id} still has {children} child module(s)"
            ))
            .into());
        }

        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM modules")
            .fetch_one(pool)
            .await
    }

    /// `id -> parent_module_id` for every module, with the rows locked until
    /// the surrounding transaction ends.
    async fn lock_hierarchy(
        conn: &mut PgConnection,
    ) -> Result<HashMap<DbId, Option<DbId>>, sqlx::Error> {
        let rows: Vec<(DbId, Option<DbId>)> =
            sqlx::query_as("SELECT id, parent_module_id FROM modules FOR UPDATE")
                .fetch_all(&mut *conn)
                .await?;
        Ok(rows.into_iter().collect())
    }
}
