//! # Carbonmeter
//!
//! The unified API for the carbon smart-meter pipeline - signed
//! telemetry in, capped energy credits and carbon offsets out.
//!
//! ## Overview
//!
//! Carbonmeter turns raw electrical measurements from field devices
//! into ledger-ready energy credits:
//!
//! - **Packets**: Signed V/I/R samples, verified against the device's
//!   Ed25519 key before anything else happens
//! - **Quota**: A per-device daily cap on credited kWh, with partial
//!   credit when a sample straddles the boundary
//! - **Identity**: A write-once binding of device, public key, and
//!   wallet address
//! - **Offsets**: CO2 accounting over credited energy, by grid region
//!
//! ## Key Concepts
//!
//! - **Reading**: Immutable once stored. Duplicate packets re-yield the
//!   stored reading instead of writing again.
//! - **Credit**: kWh granted for a packet; clamped, never more than the
//!   remaining daily quota.
//! - **Binding**: One device, one key, one wallet. Never rebound.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use carbonmeter::{IdentityBinder, MeasurementProcessor, MeterConfig};
//! use carbonmeter::core::{CableType, Keypair};
//! use carbonmeter::store::SqliteStore;
//!
//! async fn example() {
//!     let store = Arc::new(SqliteStore::open("meter.db").unwrap());
//!     let config = MeterConfig::default();
//!
//!     let binder = IdentityBinder::new(Arc::clone(&store));
//!     let processor = MeasurementProcessor::new(store, config);
//!
//!     // Register a device, then feed it packets:
//!     // binder.register(&request).await.unwrap();
//!     // processor.process(&packet, &key, CableType::TypeC).await.unwrap();
//!     let _ = (binder, processor, Keypair::generate());
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `carbonmeter::core` - Core primitives (DeviceId, VirPacket, etc.)
//! - `carbonmeter::store` - Storage abstraction and SQLite
//! - `carbonmeter::ledger` - Ledger submission

pub mod config;
pub mod error;
pub mod identity;
pub mod offset;
pub mod processor;
pub mod quota;

// Re-export component crates
pub use carbonmeter_core as core;
pub use carbonmeter_ledger as ledger;
pub use carbonmeter_store as store;

// Re-export main types for convenience
pub use config::MeterConfig;
pub use error::{MeterError, RegistrationError, RejectionReason, Result};
pub use identity::IdentityBinder;
pub use offset::OffsetEngine;
pub use processor::MeasurementProcessor;
pub use quota::{Credit, QuotaDecision, QuotaLedger};

// Re-export commonly used core types
pub use carbonmeter_core::{
    CableType, DeviceBinding, DeviceId, Ed25519PublicKey, Ed25519Signature, EnergyReading,
    Keypair, Region, RegistrationRequest, VirPacket, WalletAddress,
};
