//! Embedded migration management.
//!
//! Migrations are embedded at compile time and applied through the
//! [`PgClientMigrationExt`] extension trait, usually once at startup.

mod migrate_result;
mod run_migration;
mod run_utility;

pub use migrate_result::{MigrationResult, MigrationStatus};

use crate::{PgClient, PgResult};

/// Migration operations on a [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies every pending embedded migration.
    ///
    /// Calling this on an up-to-date database is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails to apply or the database is
    /// unreachable.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>>;

    /// Compares the embedded migrations with those recorded as applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    fn get_migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>>;

    /// Checks that the migration bookkeeping table exists.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::Migration`] if the database was never migrated.
    ///
    /// [`PgError::Migration`]: crate::PgError::Migration
    fn verify_schema_integrity(&self) -> impl Future<Output = PgResult<()>>;
}

impl PgClientMigrationExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        run_migration::run_pending_migrations(self).await
    }

    async fn get_migration_status(&self) -> PgResult<MigrationStatus> {
        let mut conn = self.get_pooled_connection().await?;
        run_utility::get_migration_status(&mut conn).await
    }

    async fn verify_schema_integrity(&self) -> PgResult<()> {
        let mut conn = self.get_pooled_connection().await?;
        run_utility::verify_schema_integrity(&mut conn).await
    }
}
