use std::ops::DerefMut;
use std::time::Instant;

use diesel_async::AsyncPgConnection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::PoolableConnection;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use super::{MigrationResult, run_utility};
use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Applies every pending embedded migration.
///
/// The diesel migration harness is synchronous, so the pooled connection is
/// wrapped and moved onto a blocking task for the duration of the run.
#[tracing::instrument(skip(pg), target = TRACING_TARGET_MIGRATION)]
pub(crate) async fn run_pending_migrations(pg: &PgClient) -> PgResult<MigrationResult> {
    let start_time = Instant::now();
    let mut conn = pg.get_pooled_connection().await?;
    let initial_status = run_utility::get_migration_status(&mut conn).await?;

    if initial_status.is_up_to_date() {
        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            applied = initial_status.applied_migrations(),
            "Database schema is up to date"
        );
        return Ok(MigrationResult::success(start_time.elapsed(), Vec::new()));
    }

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        pending = ?initial_status.pending_versions,
        "Applying pending migrations"
    );

    check_connection(&mut conn, "before");
    let mut conn: AsyncConnectionWrapper<_> = conn.into();
    let joined = spawn_blocking(move || {
        let versions = conn
            .run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.into_iter().map(|v| v.to_string()).collect::<Vec<_>>());
        (versions, conn)
    })
    .await;

    let duration = start_time.elapsed();
    let (versions, mut conn) = joined.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            duration = ?duration,
            error = %err,
            "Migration task did not complete"
        );
        PgError::Migration(err.into())
    })?;

    check_connection(conn.deref_mut(), "after");
    let versions = versions.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            duration = ?duration,
            error = %err,
            "Database migration failed"
        );
        PgError::Migration(err)
    })?;

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        duration = ?duration,
        applied = ?versions,
        "Database migrations applied"
    );

    Ok(MigrationResult::success(duration, versions))
}

fn check_connection(conn: &mut AsyncPgConnection, stage: &'static str) {
    if conn.is_broken() {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            stage,
            "Migration connection is broken"
        );
    }
}
