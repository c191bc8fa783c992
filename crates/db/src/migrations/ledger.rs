//! The `schema_migrations` ledger.

use std::collections::HashSet;

use primefire_core::types::Timestamp;
use sqlx::postgres::PgExecutor;
use sqlx::FromRow;

use crate::migrations::catalog;

pub const LEDGER_TABLE: &str = "schema_migrations";

/// One applied migration.
#[derive(Debug, Clone, FromRow)]
pub struct LedgerEntry {
    pub id: String,
    pub description: String,
    pub steps_applied: i32,
    pub applied_at: Timestamp,
}

pub async fn ensure<'e>(executor: impl PgExecutor<'e>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
             id TEXT PRIMARY KEY,
             description TEXT NOT NULL,
             steps_applied INTEGER NOT NULL,
             applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
         )",
    )
    .execute(executor)
    .await?;
    Ok(())
}

/// Every ledger row, oldest first. A database that has never been migrated
/// has no ledger yet and yields an empty list.
pub async fn entries(pool: &sqlx::PgPool) -> Result<Vec<LedgerEntry>, sqlx::Error> {
    if !catalog::table_exists(pool, LEDGER_TABLE).await? {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, LedgerEntry>(
        "SELECT id, description, steps_applied, applied_at
         FROM schema_migrations
         ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

pub async fn applied_ids(pool: &sqlx::PgPool) -> Result<HashSet<String>, sqlx::Error> {
    Ok(entries(pool).await?.into_iter().map(|e| e.id).collect())
}

pub async fn record<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
    description: &str,
    steps_applied: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO schema_migrations (id, description, steps_applied)
         VALUES ($1, $2, $3)",
    )
    .bind(id)
    .bind(description)
    .bind(steps_applied)
    .execute(executor)
    .await?;
    Ok(())
}
