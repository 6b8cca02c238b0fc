use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

use super::schema::SCHEMA_SQL;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the writer connection: WAL journal, busy timeout, schema applied.
pub fn open_writer(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))?;
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(conn)
}

/// Short-lived read-only connection for consumers.
pub fn open_reader(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}
