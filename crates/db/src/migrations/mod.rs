//! Ledger-backed, check-before-act migration runner.
//!
//! A [`Migration`] is an ordered list of [`Step`]s. The runner records every
//! fully applied migration in `schema_migrations`; a recorded migration is
//! never probed or executed again. Unrecorded migrations run step by step,
//! each step in its own transaction, and each step first inspects the
//! catalog so a partially applied migration resumes where it stopped.

pub mod catalog;
pub mod ledger;
pub mod schema;
pub mod step;

use std::collections::HashMap;
use std::fmt;

use primefire_core::seed::DefaultAccess;
use primefire_core::types::Timestamp;
use sqlx::PgPool;

use crate::error::MigrationError;
pub use step::{Probe, SkipReason, Step};

/// A named, ordered group of steps recorded in the ledger as one unit.
#[derive(Debug, Clone)]
pub struct Migration {
    /// Timestamp-prefixed identifier; plans are ordered by it.
    pub id: &'static str,
    pub description: &'static str,
    pub steps: Vec<Step>,
}

/// What happened to a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Executed. `rows` is the number of rows inserted by seed steps.
    Applied { rows: Option<u64> },
    Skipped(SkipReason),
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Applied { rows: Some(rows) } => write!(f, "applied ({rows} rows)"),
            StepOutcome::Applied { rows: None } => f.write_str("applied"),
            StepOutcome::Skipped(reason) => write!(f, "skip ({reason})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub migration: &'static str,
    pub step: String,
    pub outcome: StepOutcome,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.migration, self.step, self.outcome)
    }
}

/// Per-step outcomes of one [`Migrator::run`].
#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    pub steps: Vec<StepReport>,
    /// Migrations recorded in the ledger by this run.
    pub recorded: Vec<&'static str>,
}

impl MigrationReport {
    pub fn applied_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Applied { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Skipped(_)))
            .count()
    }

    /// Outcome of the step described as `step` in migration `migration`.
    pub fn outcome_of(&self, migration: &str, step: &str) -> Option<StepOutcome> {
        self.steps
            .iter()
            .find(|s| s.migration == migration && s.step == step)
            .map(|s| s.outcome)
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "{step}")?;
        }
        write!(
            f,
            "{} steps applied, {} skipped, {} migrations recorded",
            self.applied_count(),
            self.skipped_count(),
            self.recorded.len()
        )
    }
}

/// A migration joined with its ledger row, if any.
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    pub id: &'static str,
    pub description: &'static str,
    pub applied_at: Option<Timestamp>,
    pub steps_applied: Option<i32>,
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.applied_at, self.steps_applied) {
            (Some(at), Some(steps)) => write!(
                f,
                "{} applied {} ({steps} steps) {}",
                self.id,
                at.to_rfc3339(),
                self.description
            ),
            _ => write!(f, "{} pending {}", self.id, self.description),
        }
    }
}

/// Applies a validated migration plan.
#[derive(Debug, Clone)]
pub struct Migrator {
    migrations: Vec<Migration>,
    access: DefaultAccess,
}

impl Migrator {
    /// Validate `migrations` and build a runner for them.
    ///
    /// Identifiers must be non-empty and strictly ascending, and every
    /// migration must have at least one step.
    pub fn new(migrations: Vec<Migration>, access: DefaultAccess) -> Result<Self, MigrationError> {
        if migrations.is_empty() {
            return Err(MigrationError::InvalidPlan("plan has no migrations".into()));
        }
        let mut previous: Option<&str> = None;
        for migration in &migrations {
            if migration.id.trim().is_empty() {
                return Err(MigrationError::InvalidPlan("empty migration id".into()));
            }
            if migration.steps.is_empty() {
                return Err(MigrationError::InvalidPlan(format!(
                    "migration {} has no steps",
                    migration.id
                )));
            }
            if let Some(prev) = previous {
                if migration.id <= prev {
                    return Err(MigrationError::InvalidPlan(format!(
                        "migration {} is not ordered after {prev}",
                        migration.id
                    )));
                }
            }
            previous = Some(migration.id);
        }
        Ok(Self { migrations, access })
    }

    /// The standard plan with the bundled default access configuration.
    pub fn standard() -> Result<Self, MigrationError> {
        let access = DefaultAccess::load()
            .map_err(|e| MigrationError::InvalidPlan(format!("default access: {e}")))?;
        Self::new(schema::standard_plan(), access)
    }

    /// Restrict the plan to the migrations up to and including `id`.
    pub fn up_to(mut self, id: &str) -> Result<Self, MigrationError> {
        let position = self
            .migrations
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| MigrationError::UnknownMigration(id.to_string()))?;
        self.migrations.truncate(position + 1);
        Ok(self)
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    /// Apply every migration not yet recorded in the ledger.
    ///
    /// Stops at the first failing step. Steps committed before the failure
    /// stay committed and the failing migration is not recorded, so a later
    /// run resumes at the failed step.
    pub async fn run(&self, pool: &PgPool) -> Result<MigrationReport, MigrationError> {
        let (report, result) = self.run_reporting(pool).await;
        result.map(|()| report)
    }

    /// Like [`run`](Self::run), but the report of the steps that completed
    /// is returned even when a later step fails.
    pub async fn run_reporting(
        &self,
        pool: &PgPool,
    ) -> (MigrationReport, Result<(), MigrationError>) {
        let mut report = MigrationReport::default();
        let result = self.apply_pending(pool, &mut report).await;
        (report, result)
    }

    async fn apply_pending(
        &self,
        pool: &PgPool,
        report: &mut MigrationReport,
    ) -> Result<(), MigrationError> {
        ledger::ensure(pool).await.map_err(MigrationError::Ledger)?;
        let recorded = ledger::applied_ids(pool)
            .await
            .map_err(MigrationError::Ledger)?;

        for migration in &self.migrations {
            if recorded.contains(migration.id) {
                tracing::info!(migration = migration.id, "Migration already recorded, skipping");
                for step in &migration.steps {
                    report.steps.push(StepReport {
                        migration: migration.id,
                        step: step.description(),
                        outcome: StepOutcome::Skipped(SkipReason::RecordedInLedger),
                    });
                }
                continue;
            }

            tracing::info!(
                migration = migration.id,
                description = migration.description,
                "Applying migration"
            );
            let mut applied = 0i32;
            for step in &migration.steps {
                let outcome = self.run_step(pool, migration, step).await?;
                if matches!(outcome, StepOutcome::Applied { .. }) {
                    applied += 1;
                }
                report.steps.push(StepReport {
                    migration: migration.id,
                    step: step.description(),
                    outcome,
                });
            }

            ledger::record(pool, migration.id, migration.description, applied)
                .await
                .map_err(MigrationError::Ledger)?;
            report.recorded.push(migration.id);
            tracing::info!(migration = migration.id, steps_applied = applied, "Migration recorded");
        }

        Ok(())
    }

    async fn run_step(
        &self,
        pool: &PgPool,
        migration: &Migration,
        step: &Step,
    ) -> Result<StepOutcome, MigrationError> {
        let description = step.description();
        let failed = |source: sqlx::Error| MigrationError::StepFailed {
            migration: migration.id.to_string(),
            step: description.clone(),
            source,
        };

        let mut tx = pool.begin().await.map_err(failed)?;

        match step.probe(&mut tx).await.map_err(failed)? {
            Probe::MissingTable(table) => {
                tracing::error!(
                    migration = migration.id,
                    step = %description,
                    table,
                    "Step references a missing table"
                );
                return Err(MigrationError::MissingDependency {
                    migration: migration.id.to_string(),
                    step: description.clone(),
                    table: table.to_string(),
                });
            }
            Probe::Present(reason) => {
                tx.rollback().await.map_err(failed)?;
                tracing::warn!(
                    migration = migration.id,
                    step = %description,
                    %reason,
                    "Step skipped"
                );
                return Ok(StepOutcome::Skipped(reason));
            }
            Probe::Absent => {}
        }

        let rows = match step.apply(&mut tx, &self.access).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(
                    migration = migration.id,
                    step = %description,
                    error = %e,
                    "Step failed"
                );
                return Err(failed(e));
            }
        };
        tx.commit().await.map_err(failed)?;

        tracing::info!(migration = migration.id, step = %description, ?rows, "Step applied");
        Ok(StepOutcome::Applied { rows })
    }

    /// Every migration of the plan with its ledger state.
    pub async fn status(&self, pool: &PgPool) -> Result<Vec<MigrationStatus>, MigrationError> {
        let entries: HashMap<String, ledger::LedgerEntry> = ledger::entries(pool)
            .await
            .map_err(MigrationError::Ledger)?
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect();

        Ok(self
            .migrations
            .iter()
            .map(|m| {
                let entry = entries.get(m.id);
                MigrationStatus {
                    id: m.id,
                    description: m.description,
                    applied_at: entry.map(|e| e.applied_at),
                    steps_applied: entry.map(|e| e.steps_applied),
                }
            })
            .collect())
    }
}
