use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

/// Create the data directory if needed, open the SQLite file, and make sure
/// the `filaments` table exists. The returned connection is the one session
/// the application keeps for its whole lifetime.
pub fn open_store(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    let conn = Connection::open(db_path).context("failed to open SQLite database")?;
    ensure_schema(&conn)?;
    info!(path = %db_path.display(), "opened filament store");
    Ok(conn)
}

/// Run the lazy migration. Safe to call on every start and on in-memory
/// connections used by tests.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS filaments (
            id TEXT PRIMARY KEY NOT NULL,
            brand TEXT NOT NULL,
            material TEXT NOT NULL,
            color TEXT NOT NULL,
            weight REAL NOT NULL,
            date_opened TEXT NOT NULL,
            empty INTEGER NOT NULL,
            open INTEGER NOT NULL
        )",
        [],
    )
    .context("failed to create filaments table")?;

    Ok(())
}
