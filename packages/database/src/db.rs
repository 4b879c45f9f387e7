//! Database connection utilities.

use std::path::Path;

use duckdb::Connection;

use crate::DbError;

/// Opens (or creates) the `DuckDB` file at `path` and ensures the schema
/// exists.
///
/// # Errors
///
/// Returns [`DbError`] if the directory, connection, or schema creation
/// fails.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    if let Some(parent) = path.parent() {
        crate::paths::ensure_dir(parent)?;
    }

    log::debug!("Opening database at {}", path.display());
    let conn = Connection::open(path)?;
    create_schema(&conn)?;

    Ok(conn)
}

/// Opens a private in-memory database with the schema applied.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open_in_memory() -> Result<Connection, DbError> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS crimes (
            id TEXT NOT NULL PRIMARY KEY,
            crime_type TEXT NOT NULL,
            reported_by TEXT NOT NULL DEFAULT '',
            area_name TEXT NOT NULL DEFAULT '',
            latitude DOUBLE NOT NULL DEFAULT 0,
            longitude DOUBLE NOT NULL DEFAULT 0,
            outcome_category TEXT NOT NULL DEFAULT '',
            month TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS _session (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creation_is_idempotent() {
        let conn = open_in_memory().unwrap();
        create_schema(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables
                 WHERE table_name IN ('crimes', '_session')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}
