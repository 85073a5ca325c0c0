//! Embedded schema migrations, applied on every open.
//!
//! Statements are written with `IF NOT EXISTS`, so re-running a migration
//! against an existing file is a no-op.

use crate::ClinicDb;
use crate::error::DatabaseError;

const MIGRATIONS: &[(&str, &str)] = &[
    ("001_initial", include_str!("../migrations/001_initial.sql")),
    (
        "002_robot_maintenance",
        include_str!("../migrations/002_robot_maintenance.sql"),
    ),
];

/// Names and SQL of every embedded migration, oldest first.
#[must_use]
pub(crate) fn embedded() -> &'static [(&'static str, &'static str)] {
    MIGRATIONS
}

impl ClinicDb {
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        for (name, sql) in MIGRATIONS {
            self.conn
                .execute_batch(sql)
                .await
                .map_err(|e| DatabaseError::Migration(format!("{name}: {e}")))?;
            tracing::debug!(migration = name, "schema migration applied");
        }
        Ok(())
    }
}
