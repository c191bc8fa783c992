//! PostgreSQL persistence for the administration backend.
//!
//! - [`migrations`]: schema definitions and the ledger-backed migration runner
//! - [`seed`]: reference data loader (roles, modules, default permissions)
//! - [`models`] / [`repositories`]: row types and query functions

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod migrations;
pub mod models;
pub mod repositories;
pub mod seed;

pub use migrations::{MigrationReport, Migrator};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the standard migration plan.
pub async fn run_migrations(pool: &DbPool) -> Result<MigrationReport, error::MigrationError> {
    Migrator::standard()?.run(pool).await
}
