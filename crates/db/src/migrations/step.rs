//! Schema-change steps.
//!
//! Each step renders its own DDL, describes itself in one line, and knows
//! how to probe the catalog for its own presence. Steps never use
//! `IF NOT EXISTS`: presence is decided by the probe so the outcome can be
//! reported.

use std::fmt;

use primefire_core::seed::DefaultAccess;
use sqlx::PgConnection;

use crate::migrations::catalog;
use crate::seed::{self, SeedTarget};

/// Referential action for `ON DELETE` / `ON UPDATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FkAction {
    Cascade,
    Restrict,
}

impl FkAction {
    pub fn as_sql(self) -> &'static str {
        match self {
            FkAction::Cascade => "CASCADE",
            FkAction::Restrict => "RESTRICT",
        }
    }
}

/// `CREATE TABLE` with column definitions and the primary key.
///
/// Secondary constraints are separate [`Step::AddConstraint`] steps so a
/// table created by an older script still receives them.
#[derive(Debug, Clone)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: Vec<&'static str>,
}

/// A column added to a table that may already hold rows.
///
/// The column is always `NOT NULL` with a literal default, which PostgreSQL
/// applies to every existing row.
#[derive(Debug, Clone)]
pub struct ColumnAddition {
    pub table: &'static str,
    pub column: &'static str,
    pub sql_type: &'static str,
    pub default: &'static str,
}

#[derive(Debug, Clone)]
pub enum ConstraintKind {
    Unique {
        columns: Vec<&'static str>,
    },
    Check {
        expression: String,
    },
    ForeignKey {
        columns: Vec<&'static str>,
        references: &'static str,
        referenced_columns: Vec<&'static str>,
        on_delete: FkAction,
        on_update: FkAction,
    },
}

/// A named table constraint.
#[derive(Debug, Clone)]
pub struct ConstraintDef {
    pub table: &'static str,
    pub name: &'static str,
    pub kind: ConstraintKind,
}

/// A named secondary index. `columns` is rendered verbatim, so it may carry
/// ordering (`created_at DESC`).
#[derive(Debug, Clone)]
pub struct IndexDef {
    pub name: &'static str,
    pub table: &'static str,
    pub columns: Vec<&'static str>,
}

/// One unit of schema change, applied in its own transaction.
#[derive(Debug, Clone)]
pub enum Step {
    CreateTable(TableDef),
    AddColumn(ColumnAddition),
    AddConstraint(ConstraintDef),
    CreateIndex(IndexDef),
    Seed(SeedTarget),
}

/// Why a step did not execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The whole migration is already recorded in the ledger.
    RecordedInLedger,
    /// The table, column, constraint or index already exists.
    AlreadyPresent,
    /// The seed target already holds rows.
    TableNotEmpty,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::RecordedInLedger => "recorded in ledger",
            SkipReason::AlreadyPresent => "already present",
            SkipReason::TableNotEmpty => "table not empty",
        })
    }
}

/// Result of probing the catalog before a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Absent,
    Present(SkipReason),
    MissingTable(&'static str),
}

impl Step {
    pub fn create_table(name: &'static str, columns: &[&'static str]) -> Self {
        Step::CreateTable(TableDef {
            name,
            columns: columns.to_vec(),
        })
    }

    pub fn add_column(
        table: &'static str,
        column: &'static str,
        sql_type: &'static str,
        default: &'static str,
    ) -> Self {
        Step::AddColumn(ColumnAddition {
            table,
            column,
            sql_type,
            default,
        })
    }

    pub fn unique(table: &'static str, name: &'static str, columns: &[&'static str]) -> Self {
        Step::AddConstraint(ConstraintDef {
            table,
            name,
            kind: ConstraintKind::Unique {
                columns: columns.to_vec(),
            },
        })
    }

    pub fn check(table: &'static str, name: &'static str, expression: impl Into<String>) -> Self {
        Step::AddConstraint(ConstraintDef {
            table,
            name,
            kind: ConstraintKind::Check {
                expression: expression.into(),
            },
        })
    }

    pub fn foreign_key(
        table: &'static str,
        name: &'static str,
        column: &'static str,
        references: &'static str,
        on_delete: FkAction,
        on_update: FkAction,
    ) -> Self {
        Step::AddConstraint(ConstraintDef {
            table,
            name,
            kind: ConstraintKind::ForeignKey {
                columns: vec![column],
                references,
                referenced_columns: vec!["id"],
                on_delete,
                on_update,
            },
        })
    }

    pub fn index(name: &'static str, table: &'static str, columns: &[&'static str]) -> Self {
        Step::CreateIndex(IndexDef {
            name,
            table,
            columns: columns.to_vec(),
        })
    }

    /// One-line human-readable description.
    pub fn description(&self) -> String {
        match self {
            Step::CreateTable(t) => format!("create table {}", t.name),
            Step::AddColumn(c) => format!("add column {}.{}", c.table, c.column),
            Step::AddConstraint(c) => format!("add constraint {} on {}", c.name, c.table),
            Step::CreateIndex(i) => format!("create index {} on {}", i.name, i.table),
            Step::Seed(target) => format!("seed {}", target.table()),
        }
    }

    /// The statement this step executes. Seed steps insert through the seed
    /// loader and have no single statement.
    pub fn ddl(&self) -> Option<String> {
        match self {
            Step::CreateTable(t) => Some(format!(
                "CREATE TABLE {} (\n    {}\n)",
                t.name,
                t.columns.join(",\n    ")
            )),
            Step::AddColumn(c) => Some(format!(
                "ALTER TABLE {} ADD COLUMN {} {} NOT NULL DEFAULT {}",
                c.table, c.column, c.sql_type, c.default
            )),
            Step::AddConstraint(c) => {
                let body = match &c.kind {
                    ConstraintKind::Unique { columns } => {
                        format!("UNIQUE ({})", columns.join(", "))
                    }
                    ConstraintKind::Check { expression } => format!("CHECK ({expression})"),
                    ConstraintKind::ForeignKey {
                        columns,
                        references,
                        referenced_columns,
                        on_delete,
                        on_update,
                    } => format!(
                        "FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {} ON UPDATE {}",
                        columns.join(", "),
                        references,
                        referenced_columns.join(", "),
                        on_delete.as_sql(),
                        on_update.as_sql()
                    ),
                };
                Some(format!(
                    "ALTER TABLE {} ADD CONSTRAINT {} {}",
                    c.table, c.name, body
                ))
            }
            Step::CreateIndex(i) => Some(format!(
                "CREATE INDEX {} ON {} ({})",
                i.name,
                i.table,
                i.columns.join(", ")
            )),
            Step::Seed(_) => None,
        }
    }

    /// The table this step alters (or creates).
    pub fn table(&self) -> &'static str {
        match self {
            Step::CreateTable(t) => t.name,
            Step::AddColumn(c) => c.table,
            Step::AddConstraint(c) => c.table,
            Step::CreateIndex(i) => i.table,
            Step::Seed(target) => target.table(),
        }
    }

    /// Tables that must already exist for this step to run.
    pub fn dependencies(&self) -> Vec<&'static str> {
        match self {
            Step::CreateTable(_) => Vec::new(),
            Step::AddConstraint(ConstraintDef {
                table,
                kind: ConstraintKind::ForeignKey { references, .. },
                ..
            }) => vec![*table, *references],
            other => vec![other.table()],
        }
    }

    /// Inspect the catalog to decide whether this step still has work to do.
    pub async fn probe(&self, conn: &mut PgConnection) -> Result<Probe, sqlx::Error> {
        for table in self.dependencies() {
            if !catalog::table_exists(&mut *conn, table).await? {
                return Ok(Probe::MissingTable(table));
            }
        }

        let present = match self {
            Step::CreateTable(t) => catalog::table_exists(&mut *conn, t.name).await?,
            Step::AddColumn(c) => catalog::column_exists(&mut *conn, c.table, c.column).await?,
            Step::AddConstraint(c) => {
                catalog::constraint_exists(&mut *conn, c.table, c.name).await?
            }
            Step::CreateIndex(i) => catalog::index_exists(&mut *conn, i.name).await?,
            Step::Seed(target) => {
                if catalog::table_has_rows(&mut *conn, target.table()).await? {
                    return Ok(Probe::Present(SkipReason::TableNotEmpty));
                }
                false
            }
        };

        Ok(if present {
            Probe::Present(SkipReason::AlreadyPresent)
        } else {
            Probe::Absent
        })
    }

    /// Execute the step. Returns the number of rows inserted by seed steps.
    pub async fn apply(
        &self,
        conn: &mut PgConnection,
        access: &DefaultAccess,
    ) -> Result<Option<u64>, sqlx::Error> {
        match self {
            Step::Seed(target) => seed::insert(conn, *target, access).await.map(Some),
            other => {
                let ddl = other.ddl().unwrap_or_default();
                tracing::debug!(statement = %ddl, "Executing DDL");
                sqlx::query(&ddl).execute(&mut *conn).await?;
                Ok(None)
            }
        }
    }
}

/// Render `column IN ('a', 'b', ...)`, optionally admitting NULL.
pub fn in_list_check(column: &str, values: &[&str], nullable: bool) -> String {
    let list = values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ");
    if nullable {
        format!("{column} IS NULL OR {column} IN ({list})")
    } else {
        format!("{column} IN ({list})")
    }
}
