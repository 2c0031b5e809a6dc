#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;
mod telemetry;

use std::process;

use anyhow::Context;
use axum::Router;
use juju_server::handler::routes;
use juju_server::middleware::{RouterObservabilityExt, RouterRecoveryExt};
use juju_server::service::ServiceState;

use crate::config::{Cli, MiddlewareConfig};
use crate::server::ServerError;
use crate::telemetry::Telemetry;

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "juju_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "juju_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "juju_cli::config";

#[tokio::main]
async fn main() {
    let cli = Cli::init();

    let telemetry = match Telemetry::init() {
        Ok(telemetry) => telemetry,
        Err(error) => {
            eprintln!("Error: {error:#}");
            process::exit(1);
        }
    };

    let Err(error) = run(cli, &telemetry).await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            uptime_secs = telemetry.uptime().as_secs(),
            "Application terminated successfully"
        );
        process::exit(0);
    };

    if let Some(server_error) = error.downcast_ref::<ServerError>() {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %server_error,
            error_code = server_error.error_code(),
            recoverable = server_error.is_recoverable(),
            suggestion = server_error.suggestion(),
            "Server failed"
        );
    }

    tracing::error!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        error = format!("{error:#}"),
        "Application terminated with error"
    );

    process::exit(1);
}

/// Connects every service, then serves until a shutdown signal arrives.
async fn run(cli: Cli, telemetry: &Telemetry) -> anyhow::Result<()> {
    cli.validate()?;
    cli.log();

    let state = ServiceState::new(&cli.service)
        .await
        .context("failed to create service state")?;
    let router = create_router(state, &cli.middleware);

    server::serve(router, cli.server, telemetry).await?;
    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// The last layer added is the outermost, so recovery wraps observability,
/// which wraps the routes.
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    routes(state)
        .with_observability()
        .with_recovery(&middleware.recovery)
}
