//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL
//! string that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_secs()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Energy readings: one row per accepted packet, append-only
        CREATE TABLE readings (
            device_id BLOB NOT NULL,          -- 32 bytes
            timestamp INTEGER NOT NULL,       -- device-claimed, unix seconds
            kwh REAL NOT NULL,                -- quota-clamped credited energy
            verified INTEGER NOT NULL,        -- always 1; unverified rows are never written
            cable_type TEXT NOT NULL,         -- wire string ("type-c", "12v", "usb")
            region TEXT NOT NULL,             -- region code ("EU", "SG", ...)
            storage_key TEXT NOT NULL,        -- <bucket>/<device_hex>/<timestamp>
            record BLOB NOT NULL,             -- cached CBOR encoding of the reading
            stored_at INTEGER NOT NULL,       -- local insert time, unix seconds

            PRIMARY KEY (device_id, timestamp)
        );

        -- Device bindings: device = key = wallet, 1:1:1, write-once
        CREATE TABLE bindings (
            device_id BLOB PRIMARY KEY,       -- 32 bytes
            public_key BLOB NOT NULL UNIQUE,  -- 32 bytes, Ed25519
            wallet_address TEXT NOT NULL UNIQUE,
            registered_at INTEGER NOT NULL,   -- unix seconds
            verified INTEGER NOT NULL
        );

        -- Carbon offsets derived from verified readings
        CREATE TABLE offsets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            device_id BLOB NOT NULL,
            wallet_address TEXT NOT NULL,
            kwh REAL NOT NULL,
            co2_kg REAL NOT NULL,
            region TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            stored_at INTEGER NOT NULL
        );

        -- Indexes for common queries
        CREATE INDEX idx_readings_device ON readings(device_id, timestamp);
        CREATE INDEX idx_readings_storage_key ON readings(storage_key);
        CREATE INDEX idx_offsets_device ON offsets(device_id);
        "#,
    )?;

    Ok(())
}

/// Get current time in unix seconds.
pub(crate) fn now_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"readings".to_string()));
        assert!(tables.contains(&"bindings".to_string()));
        assert!(tables.contains(&"offsets".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }
}
