//! Health check handler.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use juju_postgres::PgClient;

use super::response::{MonitorStatusResponse, ServiceStatus};
use crate::extract::Json;
use crate::handler::Result;
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "juju_server::handler::monitors";

/// Probes the database and reports the pool state.
///
/// Responds with `503` when the database cannot be reached.
#[tracing::instrument(skip_all)]
async fn health_status(
    State(pg_client): State<PgClient>,
) -> Result<(StatusCode, Json<MonitorStatusResponse>)> {
    let database = match pg_client.ping().await {
        Ok(()) => ServiceStatus::Healthy,
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "Database health probe failed"
            );
            ServiceStatus::Unavailable
        }
    };

    let pool = pg_client.pool_status();
    if pool.is_under_pressure() {
        tracing::warn!(
            target: TRACING_TARGET,
            utilization = pool.utilization(),
            waiting = pool.waiting,
            "Connection pool under pressure"
        );
    }

    let response = MonitorStatusResponse::new(database, pool);
    let status_code = if response.is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(
        target: TRACING_TARGET,
        database = %database,
        status_code = status_code.as_u16(),
        "Health status response prepared"
    );

    Ok((status_code, Json(response)))
}

/// Returns a [`Router`] with all health monitoring routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health/", get(health_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test::create_test_server_with_router;

    #[tokio::test]
    async fn unreachable_database_is_unavailable() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes())?;

        let response = server.get("/health/").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let status = response.json::<MonitorStatusResponse>();
        assert!(!status.is_healthy);
        assert_eq!(status.database, ServiceStatus::Unavailable);
        assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
        Ok(())
    }
}
