use crate::infrastructure::StorageBackend;
use anyhow::{Context, Result};
use duckdb::{Connection, OptionalExt, params};
use std::path::Path;
use std::sync::Mutex;

/// Key-value backend over a single DuckDB table.
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

// The connection is only ever touched through the Mutex.
unsafe impl Send for DuckDbBackend {}
unsafe impl Sync for DuckDbBackend {}

impl DuckDbBackend {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path).context("failed to open DuckDB connection")?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .context("failed to create in-memory DuckDB connection")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let backend = Self {
            conn: Mutex::new(conn),
        };
        backend.initialize()?;
        Ok(backend)
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );
            "#,
        )
        .context("failed to create kv table")?;
        Ok(())
    }
}

impl StorageBackend for DuckDbBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()
            .context("failed to read from kv table")?;
        Ok(value)
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
            params![key, bytes],
        )
        .context("failed to write to kv table")?;
        Ok(())
    }
}
