use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct DatabaseDiagnostics {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u128>,
    connection_pool: ConnectionPoolDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied_migrations: Option<i64>,
}

#[derive(Serialize)]
pub struct ConnectionPoolDiagnostics {
    size: u32,
    idle_connections: usize,
    max_connections: u32,
}

/// GET /api/diagnostics/database
///
/// Operator-facing snapshot: round-trip latency, pool utilization, and the
/// applied migration count. Failure detail stays in the server logs.
pub async fn database_diagnostics_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<DatabaseDiagnostics>) {
    let pool_options = state.db_pool.options();
    let connection_pool = ConnectionPoolDiagnostics {
        size: state.db_pool.size(),
        idle_connections: state.db_pool.num_idle(),
        max_connections: pool_options.get_max_connections(),
    };

    let started = std::time::Instant::now();
    let ping = sqlx::query("SELECT 1").execute(&state.db_pool).await;
    let latency_ms = started.elapsed().as_millis();

    match ping {
        Ok(_) => {
            let applied_migrations =
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations")
                    .fetch_one(&state.db_pool)
                    .await
                    .ok();

            (
                StatusCode::OK,
                Json(DatabaseDiagnostics {
                    status: "ok".to_string(),
                    latency_ms: Some(latency_ms),
                    connection_pool,
                    applied_migrations,
                }),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Database diagnostics query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DatabaseDiagnostics {
                    status: "error".to_string(),
                    latency_ms: None,
                    connection_pool,
                    applied_migrations: None,
                }),
            )
        }
    }
}
