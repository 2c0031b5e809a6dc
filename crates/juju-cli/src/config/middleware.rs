//! Middleware configuration for the HTTP server.

use anyhow::anyhow;
use clap::Args;
use juju_server::middleware::RecoveryConfig;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Longest accepted request timeout in seconds.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// HTTP middleware settings.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request timeout and panic recovery.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Checks that the request timeout is between 1 and 300 seconds.
    pub fn validate(&self) -> anyhow::Result<()> {
        let timeout = self.recovery.request_timeout;
        if timeout == 0 || timeout > MAX_REQUEST_TIMEOUT_SECS {
            return Err(anyhow!(
                "Request timeout {timeout} seconds is invalid. Must be between 1 and {MAX_REQUEST_TIMEOUT_SECS} seconds."
            ));
        }

        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = self.recovery.request_timeout,
            "Recovery configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_bounds() {
        let config = |secs| MiddlewareConfig {
            recovery: RecoveryConfig::with_timeout_secs(secs),
        };

        assert!(config(30).validate().is_ok());
        assert!(config(0).validate().is_err());
        assert!(config(301).validate().is_err());
    }
}
