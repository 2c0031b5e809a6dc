use jiff::Timestamp;
use juju_postgres::PgPoolStatus;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Reachability of a backing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceStatus {
    Healthy,
    Unavailable,
}

/// Body of `GET /health/`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatusResponse {
    /// Whether every backing service is reachable.
    pub is_healthy: bool,
    /// Status of the PostgreSQL database.
    pub database: ServiceStatus,

    /// Open pooled connections.
    pub pool_size: usize,
    /// Idle pooled connections.
    pub pool_available: usize,
    /// Callers waiting for a pooled connection.
    pub pool_waiting: usize,

    /// Application version.
    pub version: String,
    /// Timestamp when this status was generated.
    pub updated_at: Timestamp,
}

impl MonitorStatusResponse {
    /// Builds a response from the database probe result and pool snapshot.
    pub fn new(database: ServiceStatus, pool: PgPoolStatus) -> Self {
        Self {
            is_healthy: database == ServiceStatus::Healthy,
            database,
            pool_size: pool.size,
            pool_available: pool.available,
            pool_waiting: pool.waiting,
            version: env!("CARGO_PKG_VERSION").to_owned(),
            updated_at: Timestamp::now(),
        }
    }
}
