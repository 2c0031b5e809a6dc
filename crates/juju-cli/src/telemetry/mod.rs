//! Logging setup.

mod tracing;

use std::time::{Duration, Instant};

use anyhow::Context;

/// Handle to the installed tracing subscriber.
///
/// Created once by [`Telemetry::init`] in `main` and passed down to the
/// server, which reports uptime through it on shutdown.
#[derive(Debug)]
#[must_use = "telemetry should be passed to the server"]
pub struct Telemetry {
    filter: String,
    started_at: Instant,
}

impl Telemetry {
    /// Installs the global subscriber, filtered by `RUST_LOG` or `info`.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter is invalid or a subscriber is already
    /// installed.
    pub fn init() -> anyhow::Result<Self> {
        let directives = std::env::var(tracing::FILTER_ENV).ok();
        let filter = tracing::init_tracing(directives.as_deref())
            .context("failed to initialize tracing")?;

        Ok(Self {
            filter,
            started_at: Instant::now(),
        })
    }

    /// Returns the active filter directives.
    #[inline]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Returns the time elapsed since logging was initialized.
    #[inline]
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
