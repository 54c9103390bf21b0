//! # Carbonmeter Store
//!
//! Durable-store abstraction for the Carbonmeter pipeline. Provides a
//! trait-based interface for persisting energy readings, device
//! bindings, and offset records, with SQLite and in-memory
//! implementations.
//!
//! ## Overview
//!
//! The pipeline treats persistence as an abstract key-value service:
//! readings are keyed `<region-bucket>/<device_id_hex>/<timestamp>`,
//! bindings by device id. The [`Store`] trait also carries the three
//! uniqueness queries the identity binder needs (device, key, wallet).
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all persistence operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`InsertResult`] - Result of inserting a reading
//!
//! ## Design Notes
//!
//! - **Append-only**: readings, bindings, and offsets are never updated
//!   or deleted once written.
//! - **Idempotent reading inserts**: the same reading twice returns
//!   `AlreadyExists`; a *different* reading at the same device/timestamp
//!   returns `Conflict`.
//! - **Binding uniqueness**: the binder checks before inserting; the
//!   SQLite backend additionally enforces UNIQUE constraints on device,
//!   key, and wallet as a backstop.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, Store};
