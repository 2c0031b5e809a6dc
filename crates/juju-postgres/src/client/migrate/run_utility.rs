//! Read-only inspection of the migration state.

use diesel::migration::MigrationSource;
use diesel::pg::Pg;
use diesel::sql_types::{Bool, Text};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use super::MigrationStatus;
use crate::{MIGRATIONS, PgError, PgResult, TRACING_TARGET_MIGRATION};

#[derive(diesel::QueryableByName)]
struct TableExists {
    #[diesel(sql_type = Bool)]
    exists: bool,
}

#[derive(diesel::QueryableByName)]
struct AppliedVersion {
    #[diesel(sql_type = Text)]
    version: String,
}

/// Returns the versions of every embedded migration, oldest first.
pub(crate) fn embedded_versions() -> PgResult<Vec<String>> {
    let migrations = MigrationSource::<Pg>::migrations(&MIGRATIONS).map_err(PgError::Migration)?;
    let mut versions: Vec<String> = migrations
        .iter()
        .map(|m| m.name().version().to_string())
        .collect();
    versions.sort();
    Ok(versions)
}

/// Compares embedded migrations against those recorded as applied.
#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub(crate) async fn get_migration_status(
    conn: &mut AsyncPgConnection,
) -> PgResult<MigrationStatus> {
    let applied_versions = get_applied_migrations(conn).await?;
    let pending_versions: Vec<String> = embedded_versions()?
        .into_iter()
        .filter(|version| !applied_versions.contains(version))
        .collect();

    let status = MigrationStatus::new(applied_versions, pending_versions);
    tracing::debug!(
        target: TRACING_TARGET_MIGRATION,
        applied_count = status.applied_migrations(),
        pending_count = status.pending_migrations(),
        "Migration status retrieved"
    );

    Ok(status)
}

/// Fails if the migration bookkeeping table does not exist.
#[tracing::instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub(crate) async fn verify_schema_integrity(conn: &mut AsyncPgConnection) -> PgResult<()> {
    if !migration_table_exists(conn).await? {
        tracing::warn!(target: TRACING_TARGET_MIGRATION, "Migration table is missing, database was never migrated");
        return Err(PgError::Migration(
            "Migration table __diesel_schema_migrations does not exist".into(),
        ));
    }

    Ok(())
}

/// Returns applied migration versions, or nothing on a fresh database.
pub(crate) async fn get_applied_migrations(conn: &mut AsyncPgConnection) -> PgResult<Vec<String>> {
    if !migration_table_exists(conn).await? {
        return Ok(Vec::new());
    }

    let versions = diesel::sql_query("SELECT version FROM __diesel_schema_migrations ORDER BY version")
        .get_results::<AppliedVersion>(conn)
        .await
        .map_err(|e| PgError::Migration(format!("Failed to read applied migrations: {e}").into()))?
        .into_iter()
        .map(|row| row.version)
        .collect();

    Ok(versions)
}

async fn migration_table_exists(conn: &mut AsyncPgConnection) -> PgResult<bool> {
    let row = diesel::sql_query(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_name = '__diesel_schema_migrations'
        ) AS exists",
    )
    .get_result::<TableExists>(conn)
    .await
    .map_err(|e| PgError::Migration(format!("Failed to check migration table: {e}").into()))?;

    Ok(row.exists)
}

#[cfg(test)]
mod tests {
    use super::embedded_versions;

    #[test]
    fn embeds_initial_migration() {
        let versions = embedded_versions().expect("embedded migrations should load");
        assert!(versions.iter().any(|v| v == "20250731000000"));
    }
}
