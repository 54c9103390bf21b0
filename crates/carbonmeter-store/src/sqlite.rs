//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for Carbonmeter. It uses
//! rusqlite with bundled SQLite, wrapped in async via
//! tokio::spawn_blocking.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use carbonmeter_core::{
    DeviceBinding, DeviceId, Ed25519PublicKey, EnergyReading, OffsetRecord, Region, WalletAddress,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertResult, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| {
                StoreError::InvalidData(format!("connection mutex poisoned: {}", e))
            })?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::InvalidData(format!("spawn_blocking failed: {}", e)))?
    }
}

/// Encode a reading to its cached CBOR record form.
fn encode_reading(reading: &EnergyReading) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(reading, &mut buf)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

/// Decode a reading from its cached CBOR record form.
fn decode_reading(bytes: &[u8]) -> Result<EnergyReading> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Convert a bindings row into a DeviceBinding.
fn row_to_binding(row: &rusqlite::Row<'_>) -> rusqlite::Result<DeviceBinding> {
    let device_bytes: Vec<u8> = row.get("device_id")?;
    let key_bytes: Vec<u8> = row.get("public_key")?;
    let wallet: String = row.get("wallet_address")?;

    let invalid = |name: &str, idx: usize| {
        rusqlite::Error::InvalidColumnType(idx, name.into(), rusqlite::types::Type::Blob)
    };

    Ok(DeviceBinding {
        device_id: DeviceId::try_from(device_bytes.as_slice())
            .map_err(|_| invalid("device_id", 0))?,
        public_key: Ed25519PublicKey::try_from(key_bytes.as_slice())
            .map_err(|_| invalid("public_key", 1))?,
        wallet_address: WalletAddress::new(wallet).map_err(|_| invalid("wallet_address", 2))?,
        registered_at: row.get("registered_at")?,
        verified: row.get::<_, i64>("verified")? != 0,
    })
}

/// Convert an offsets row into an OffsetRecord.
fn row_to_offset(row: &rusqlite::Row<'_>) -> rusqlite::Result<OffsetRecord> {
    let device_bytes: Vec<u8> = row.get("device_id")?;
    let wallet: String = row.get("wallet_address")?;
    let region: String = row.get("region")?;

    let invalid = |name: &str, idx: usize| {
        rusqlite::Error::InvalidColumnType(idx, name.into(), rusqlite::types::Type::Text)
    };

    Ok(OffsetRecord {
        device_id: DeviceId::try_from(device_bytes.as_slice())
            .map_err(|_| invalid("device_id", 0))?,
        wallet_address: WalletAddress::new(wallet).map_err(|_| invalid("wallet_address", 1))?,
        kwh: row.get("kwh")?,
        co2_kg: row.get("co2_kg")?,
        region: Region::from_str(&region).map_err(|_| invalid("region", 5))?,
        timestamp: row.get("timestamp")?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_reading(&self, reading: &EnergyReading) -> Result<InsertResult> {
        let reading = reading.clone();

        self.blocking(move |conn| {
            let record = encode_reading(&reading)?;

            // Idempotence check at the reading's key.
            let existing: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT record FROM readings WHERE device_id = ?1 AND timestamp = ?2",
                    params![reading.device_id.as_bytes().as_slice(), reading.timestamp],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing) = existing {
                if existing == record {
                    return Ok(InsertResult::AlreadyExists);
                }
                return Ok(InsertResult::Conflict);
            }

            conn.execute(
                "INSERT INTO readings (
                    device_id, timestamp, kwh, verified, cable_type, region,
                    storage_key, record, stored_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    reading.device_id.as_bytes().as_slice(),
                    reading.timestamp,
                    reading.kwh,
                    reading.verified as i64,
                    reading.cable_type.as_str(),
                    reading.region.as_str(),
                    reading.storage_key(),
                    record,
                    migration::now_secs(),
                ],
            )?;

            debug!(device = %reading.device_id, kwh = reading.kwh, "stored reading");
            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn get_reading(
        &self,
        device_id: &DeviceId,
        timestamp: i64,
    ) -> Result<Option<EnergyReading>> {
        let device_id = *device_id;

        self.blocking(move |conn| {
            let record: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT record FROM readings WHERE device_id = ?1 AND timestamp = ?2",
                    params![device_id.as_bytes().as_slice(), timestamp],
                    |row| row.get(0),
                )
                .optional()?;

            record.map(|r| decode_reading(&r)).transpose()
        })
        .await
    }

    async fn list_readings(&self, device_id: &DeviceId) -> Result<Vec<EnergyReading>> {
        let device_id = *device_id;

        self.blocking(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT record FROM readings WHERE device_id = ?1 ORDER BY timestamp",
            )?;
            let rows = stmt.query_map(params![device_id.as_bytes().as_slice()], |row| {
                row.get::<_, Vec<u8>>(0)
            })?;

            let mut readings = Vec::new();
            for row in rows {
                readings.push(decode_reading(&row?)?);
            }
            Ok(readings)
        })
        .await
    }

    async fn insert_binding(&self, binding: &DeviceBinding) -> Result<()> {
        let binding = binding.clone();

        self.blocking(move |conn| {
            // The three uniqueness checks under the connection mutex, so
            // check and insert cannot interleave with another writer.
            let device_taken: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM bindings WHERE device_id = ?1",
                    params![binding.device_id.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;
            if device_taken.is_some() {
                return Err(StoreError::Conflict {
                    field: "device_id",
                    value: binding.device_id.to_hex(),
                });
            }

            let key_taken: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM bindings WHERE public_key = ?1",
                    params![binding.public_key.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;
            if key_taken.is_some() {
                return Err(StoreError::Conflict {
                    field: "public_key",
                    value: binding.public_key.to_hex(),
                });
            }

            let wallet_taken: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM bindings WHERE wallet_address = ?1",
                    params![binding.wallet_address.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            if wallet_taken.is_some() {
                return Err(StoreError::Conflict {
                    field: "wallet_address",
                    value: binding.wallet_address.to_string(),
                });
            }

            conn.execute(
                "INSERT INTO bindings (
                    device_id, public_key, wallet_address, registered_at, verified
                ) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    binding.device_id.as_bytes().as_slice(),
                    binding.public_key.as_bytes().as_slice(),
                    binding.wallet_address.as_str(),
                    binding.registered_at,
                    binding.verified as i64,
                ],
            )?;

            debug!(device = %binding.device_id, wallet = %binding.wallet_address, "stored binding");
            Ok(())
        })
        .await
    }

    async fn get_binding(&self, device_id: &DeviceId) -> Result<Option<DeviceBinding>> {
        let device_id = *device_id;

        self.blocking(move |conn| {
            Ok(conn
                .query_row(
                    "SELECT device_id, public_key, wallet_address, registered_at, verified
                     FROM bindings WHERE device_id = ?1",
                    params![device_id.as_bytes().as_slice()],
                    row_to_binding,
                )
                .optional()?)
        })
        .await
    }

    async fn find_device_for_key(&self, key: &Ed25519PublicKey) -> Result<Option<DeviceId>> {
        let key = *key;

        self.blocking(move |conn| {
            let device: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT device_id FROM bindings WHERE public_key = ?1",
                    params![key.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;

            device
                .map(|d| {
                    DeviceId::try_from(d.as_slice())
                        .map_err(|_| StoreError::InvalidData("bad device_id in bindings".into()))
                })
                .transpose()
        })
        .await
    }

    async fn is_wallet_bound(&self, wallet: &WalletAddress) -> Result<bool> {
        let wallet = wallet.clone();

        self.blocking(move |conn| {
            let bound: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM bindings WHERE wallet_address = ?1",
                    params![wallet.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(bound.is_some())
        })
        .await
    }

    async fn insert_offset(&self, record: &OffsetRecord) -> Result<()> {
        let record = record.clone();

        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO offsets (
                    device_id, wallet_address, kwh, co2_kg, region, timestamp, stored_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.device_id.as_bytes().as_slice(),
                    record.wallet_address.as_str(),
                    record.kwh,
                    record.co2_kg,
                    record.region.as_str(),
                    record.timestamp,
                    migration::now_secs(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_offsets(&self, device_id: &DeviceId) -> Result<Vec<OffsetRecord>> {
        let device_id = *device_id;

        self.blocking(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT device_id, wallet_address, kwh, co2_kg, region, timestamp
                 FROM offsets WHERE device_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![device_id.as_bytes().as_slice()], row_to_offset)?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
    }
}
