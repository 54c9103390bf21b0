//! # Carbonmeter Core
//!
//! Pure primitives for the Carbonmeter pipeline: identifiers, Ed25519
//! verification, canonical wire encodings, and energy conversion.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over telemetry and cryptographic data.
//!
//! ## Key Types
//!
//! - [`DeviceId`] - 32-byte identifier of one physical metering device
//! - [`Ed25519PublicKey`] / [`Ed25519Signature`] - fixed-size crypto newtypes
//! - [`VirPacket`] - one signed voltage/current/resistance sample
//! - [`EnergyReading`] - the accepted, verified energy record
//! - [`DeviceBinding`] - the permanent device/key/wallet association
//!
//! ## Wire formats
//!
//! All signed messages and the ledger payload use fixed little-endian
//! layouts matching the device firmware. See the [`wire`] module.

pub mod convert;
pub mod crypto;
pub mod error;
pub mod records;
pub mod types;
pub mod wire;

pub use convert::{kwh_to_micro, vir_to_kwh};
pub use crypto::{Ed25519PublicKey, Ed25519Signature, Keypair};
pub use error::CoreError;
pub use records::{DeviceBinding, EnergyReading, OffsetRecord, RegistrationRequest, VirPacket};
pub use types::{day_bucket, CableType, DeviceId, Region, WalletAddress, SECONDS_PER_DAY};
pub use wire::{
    identity_message, ledger_payload, verify_device_identity, verify_vir_packet,
    vir_signed_message,
};
