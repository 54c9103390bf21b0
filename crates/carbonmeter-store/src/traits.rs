//! Store trait: the abstract interface for durable persistence.
//!
//! This trait keeps the pipeline storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use carbonmeter_core::{
    DeviceBinding, DeviceId, Ed25519PublicKey, EnergyReading, OffsetRecord, WalletAddress,
};

use crate::error::Result;

/// Result of inserting an energy reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Reading was inserted successfully.
    Inserted,
    /// The exact same reading already exists (idempotent, not an error).
    AlreadyExists,
    /// A different reading exists at the same device/timestamp.
    Conflict,
}

/// The Store trait: async interface for durable persistence.
///
/// All methods are async to support both sync (SQLite via
/// `spawn_blocking`) and natively async backends.
///
/// # Design Notes
///
/// - **Idempotent reading inserts**: the same reading twice returns
///   `AlreadyExists`.
/// - **Uniqueness queries**: `get_binding`, `find_device_for_key`, and
///   `is_wallet_bound` back the identity binder's three checks.
/// - **No updates**: every record type is append-only.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Energy Readings
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a verified energy reading.
    async fn insert_reading(&self, reading: &EnergyReading) -> Result<InsertResult>;

    /// Get a reading by device and timestamp.
    async fn get_reading(
        &self,
        device_id: &DeviceId,
        timestamp: i64,
    ) -> Result<Option<EnergyReading>>;

    /// List all readings for a device, ordered by timestamp.
    async fn list_readings(&self, device_id: &DeviceId) -> Result<Vec<EnergyReading>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Device Bindings
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a device binding.
    ///
    /// Returns [`crate::StoreError::Conflict`] if the device, key, or
    /// wallet is already bound. The binder performs ordered checks
    /// before calling this; the constraint here is a backstop, not the
    /// primary uniqueness mechanism.
    async fn insert_binding(&self, binding: &DeviceBinding) -> Result<()>;

    /// Get the binding for a device, if any.
    async fn get_binding(&self, device_id: &DeviceId) -> Result<Option<DeviceBinding>>;

    /// Find which device a public key is bound to, if any.
    async fn find_device_for_key(&self, key: &Ed25519PublicKey) -> Result<Option<DeviceId>>;

    /// Whether a wallet address is already bound to any device.
    async fn is_wallet_bound(&self, wallet: &WalletAddress) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Offset Records
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a carbon offset record.
    async fn insert_offset(&self, record: &OffsetRecord) -> Result<()>;

    /// List all offset records for a device, in insertion order.
    async fn list_offsets(&self, device_id: &DeviceId) -> Result<Vec<OffsetRecord>>;
}
