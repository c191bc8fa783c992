//! Schema introspection used by the check-before-act migration steps.
//!
//! Every probe is scoped to `current_schema()`, so tests running in an
//! isolated database (or schema) see only their own objects.

use sqlx::postgres::PgExecutor;

/// Whether a base table named `table` exists.
pub async fn table_exists<'e>(executor: impl PgExecutor<'e>, table: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
             SELECT 1
             FROM information_schema.tables
             WHERE table_schema = current_schema()
               AND table_name = $1
               AND table_type = 'BASE TABLE'
         )",
    )
    .bind(table)
    .fetch_one(executor)
    .await
}

/// Whether `table` has a column named `column`.
pub async fn column_exists<'e>(
    executor: impl PgExecutor<'e>,
    table: &str,
    column: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
             SELECT 1
             FROM information_schema.columns
             WHERE table_schema = current_schema()
               AND table_name = $1
               AND column_name = $2
         )",
    )
    .bind(table)
    .bind(column)
    .fetch_one(executor)
    .await
}

/// Whether a constraint named `constraint` is declared on `table`.
pub async fn constraint_exists<'e>(
    executor: impl PgExecutor<'e>,
    table: &str,
    constraint: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
             SELECT 1
             FROM information_schema.table_constraints
             WHERE constraint_schema = current_schema()
               AND table_name = $1
               AND constraint_name = $2
         )",
    )
    .bind(table)
    .bind(constraint)
    .fetch_one(executor)
    .await
}

/// Whether an index named `index` exists.
pub async fn index_exists<'e>(executor: impl PgExecutor<'e>, index: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
             SELECT 1
             FROM pg_indexes
             WHERE schemaname = current_schema()
               AND indexname = $1
         )",
    )
    .bind(index)
    .fetch_one(executor)
    .await
}

/// Whether `table` contains at least one row.
///
/// `table` is interpolated into the statement, so callers must only pass
/// identifiers from the static schema definitions.
pub async fn table_has_rows<'e>(executor: impl PgExecutor<'e>, table: &str) -> Result<bool, sqlx::Error> {
    let query = format!("SELECT EXISTS (SELECT 1 FROM {table})");
    sqlx::query_scalar::<_, bool>(&query)
        .fetch_one(executor)
        .await
}
