//! Storage layer
//!
//! Opens the SQLite file under the data directory, turns on foreign-key
//! enforcement and applies the schema. The resulting connection is owned by
//! [`crate::Store`].

pub mod error;
pub mod schema;

use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

pub use error::{StorageError, StorageResult};
pub use schema::init_schema;

/// Open (creating if needed) the database file inside `data_dir`
pub fn open_database(data_dir: &Path, file_name: &str) -> StorageResult<Connection> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| StorageError::from_io(e, data_dir.to_path_buf()))?;

    let path = data_dir.join(file_name);
    let conn = Connection::open(&path).map_err(|source| StorageError::Open {
        path: path.clone(),
        source,
    })?;

    prepare(&conn)?;
    debug!("Schema applied to {:?}", path);
    Ok(conn)
}

/// Open a private in-memory database (for testing)
pub fn open_in_memory() -> StorageResult<Connection> {
    let conn = Connection::open_in_memory().map_err(|source| StorageError::Open {
        path: ":memory:".into(),
        source,
    })?;
    prepare(&conn)?;
    Ok(conn)
}

fn prepare(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(StorageError::Schema)?;
    init_schema(conn).map_err(StorageError::Schema)
}
