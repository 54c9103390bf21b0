//! Error types for the metering pipeline.
//!
//! Rejections are values, not faults: a rejected packet, registration,
//! or submission leaves the pipeline fully available. Only store
//! failures propagate as errors in the operational sense.

use carbonmeter_core::CableType;
use carbonmeter_store::StoreError;
use thiserror::Error;

/// Why a telemetry packet was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectionReason {
    /// The packet arrived over a cable type the meter does not accept.
    #[error("unsupported transport: {0}")]
    UnsupportedTransport(CableType),

    /// The packet's signature did not verify against the device key.
    #[error("invalid packet signature")]
    InvalidSignature,

    /// The device's daily quota is exhausted; no credit remains today.
    #[error("daily quota exhausted")]
    QuotaExhausted,
}

/// Why a registration request was refused. First failure wins, in this
/// order: signature, device, key, wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The request signature did not verify against the offered key.
    #[error("invalid registration signature")]
    InvalidSignature,

    /// The device is already bound. Registration is write-once, so an
    /// identical re-registration also lands here.
    #[error("device already registered")]
    DeviceAlreadyRegistered,

    /// The public key is already bound to a device.
    #[error("public key already registered")]
    KeyAlreadyRegistered,

    /// The wallet address is already bound to a device.
    #[error("wallet already bound")]
    WalletAlreadyBound,
}

/// Errors from pipeline operations.
#[derive(Debug, Error)]
pub enum MeterError {
    /// The packet was rejected; no durable write occurred.
    #[error("packet rejected: {0}")]
    Rejected(#[from] RejectionReason),

    /// The registration was refused; no binding was created.
    #[error("registration refused: {0}")]
    Registration(#[from] RegistrationError),

    /// The durable store failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, MeterError>;
