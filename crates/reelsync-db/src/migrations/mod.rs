//! Schema migrations.
//!
//! Migration scripts are embedded in the binary. The applied version is kept
//! in SQLite's `user_version` pragma, so there is no bookkeeping table.

use reelsync_common::{Error, Result};
use rusqlite::Connection;

/// Ordered migration scripts; index + 1 is the schema version.
const MIGRATIONS: &[(&str, &str)] = &[("initial", include_str!("001_initial.sql"))];

/// Schema version the catalog is at.
pub fn schema_version(conn: &Connection) -> Result<usize> {
    conn.query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))
        .map(|v| v as usize)
        .map_err(|e| Error::database(format!("Failed to read schema version: {}", e)))
}

/// Bring the schema up to date. Returns how many migrations ran.
///
/// Each script and its version bump commit together.
pub fn run_migrations(conn: &Connection) -> Result<usize> {
    let current = schema_version(conn)?;
    let mut applied = 0;

    for (index, (name, sql)) in MIGRATIONS.iter().enumerate().skip(current) {
        let version = index + 1;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(sql)
            .and_then(|_| tx.pragma_update(None, "user_version", version as i64))
            .and_then(|_| tx.commit())
            .map_err(|e| Error::database(format!("Migration {} ({}) failed: {}", version, name, e)))?;

        tracing::info!(version, name, "Applied migration");
        applied += 1;
    }

    Ok(applied)
}
