//! Error types for Carbonmeter core primitives.

use thiserror::Error;

/// Errors from constructing or verifying core data.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid {field} length: expected {expected} bytes, got {got}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("unknown cable type: {0:?}")]
    UnknownCableType(String),

    #[error("unknown region: {0:?}")]
    UnknownRegion(String),

    #[error("wallet address must not be empty")]
    EmptyWalletAddress,
}
