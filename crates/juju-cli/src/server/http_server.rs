use std::future::IntoFuture;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::shutdown::shutdown_signal;
use super::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::telemetry::Telemetry;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves `app` with graceful shutdown.
///
/// After a shutdown signal, in-flight requests get `shutdown_timeout` to
/// finish before the server returns anyway.
pub(super) async fn serve_http(
    app: Router,
    server_config: ServerConfig,
    telemetry: &Telemetry,
) -> ServerResult<()> {
    server_config
        .validate()
        .map_err(|e| ServerError::invalid_config(&e))?;

    let server_addr = server_config.server_addr();
    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %err,
            "Failed to bind to address"
        );
        ServerError::bind_error(&server_addr.to_string(), err)
    })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        log_filter = telemetry.filter(),
        "Server is ready and listening for connections"
    );

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server is bound to all interfaces, ensure firewall rules are configured"
        );
    }

    let signaled = Arc::new(Notify::new());
    let on_signal = {
        let signaled = Arc::clone(&signaled);
        async move {
            shutdown_signal().await;
            signaled.notify_one();
        }
    };

    let shutdown_timeout = server_config.shutdown_timeout();
    let drain_deadline = async {
        signaled.notified().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(on_signal)
        .into_future();

    tokio::select! {
        result = server => result.map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                "Server encountered an error"
            );
            ServerError::Runtime(err)
        })?,
        () = drain_deadline => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                timeout_secs = shutdown_timeout.as_secs(),
                "Shutdown timeout elapsed, dropping in-flight requests"
            );
        }
    }

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        uptime_secs = telemetry.uptime().as_secs(),
        "Server shut down"
    );

    Ok(())
}
