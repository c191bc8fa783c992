//! Error types for the database layer.

use primefire_core::error::CoreError;

/// PostgreSQL SQLSTATE for `foreign_key_violation`.
pub const SQLSTATE_FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL SQLSTATE for `unique_violation`.
pub const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE for `check_violation`.
pub const SQLSTATE_CHECK_VIOLATION: &str = "23514";

/// Errors raised while planning or applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Invalid migration plan: {0}")]
    InvalidPlan(String),

    #[error("Unknown migration '{0}'")]
    UnknownMigration(String),

    #[error("Migration {migration} step '{step}' requires table '{table}', which does not exist")]
    MissingDependency {
        migration: String,
        step: String,
        table: String,
    },

    #[error("Migration {migration} step '{step}' failed: {source}")]
    StepFailed {
        migration: String,
        step: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Migration ledger error: {0}")]
    Ledger(#[source] sqlx::Error),
}

/// Errors from repositories that enforce domain rules before writing.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}

/// Whether the error is a foreign key violation raised by the engine.
pub fn is_referential_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some(SQLSTATE_FOREIGN_KEY_VIOLATION)
}

/// Whether the error is a unique constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some(SQLSTATE_UNIQUE_VIOLATION)
}

/// Whether the error is a check constraint violation.
pub fn is_check_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some(SQLSTATE_CHECK_VIOLATION)
}

/// Name of the constraint a database error was raised on, if any.
pub fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_classified() {
        let err = sqlx::Error::RowNotFound;
        assert!(!is_referential_violation(&err));
        assert!(!is_unique_violation(&err));
        assert!(!is_check_violation(&err));
        assert!(violated_constraint(&err).is_none());
    }
}
