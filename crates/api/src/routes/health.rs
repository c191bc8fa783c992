//! Liveness and schema readiness check, mounted outside `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use primefire_db::migrations::ledger;
use primefire_db::Migrator;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the database answers and every planned migration is
    /// recorded, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Rows in the migration ledger.
    pub migrations_applied: usize,
    pub migrations_planned: usize,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = primefire_db::health_check(&state.pool).await.is_ok();
    let migrations_applied = if db_healthy {
        ledger::entries(&state.pool)
            .await
            .map(|entries| entries.len())
            .unwrap_or(0)
    } else {
        0
    };
    let migrations_planned = Migrator::standard()
        .map(|m| m.migrations().len())
        .unwrap_or(0);

    let status = if db_healthy && migrations_applied >= migrations_planned {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        migrations_applied,
        migrations_planned,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
