//! HTTP server startup and graceful shutdown.

mod error;
mod http_server;
mod shutdown;

use axum::Router;

pub use self::error::{ServerError, ServerResult};
use self::http_server::serve_http;
use crate::config::ServerConfig;
use crate::telemetry::Telemetry;

/// Serves `app` until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the address cannot be
/// bound or the server fails while running.
pub async fn serve(app: Router, config: ServerConfig, telemetry: &Telemetry) -> ServerResult<()> {
    serve_http(app, config, telemetry).await
}
