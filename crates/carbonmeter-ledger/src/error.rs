//! Error types for ledger submission.

use thiserror::Error;

/// Coarse classification of a failed dispatch to the ledger endpoint.
///
/// The caller cannot distinguish transient from permanent failure
/// beyond these classes; retry-or-escalate policy is theirs.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The endpoint could not be reached or the connection broke.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint refused the payload before execution.
    #[error("validation error: {0}")]
    Validation(String),

    /// The ledger executed and rejected the transaction.
    #[error("ledger rejected transaction: {0}")]
    Rejected(String),
}

/// Errors surfaced by [`crate::Submitter::submit`].
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The device identity signature did not verify. The ledger was
    /// never contacted.
    #[error("device signature did not verify")]
    InvalidSignature,

    /// Dispatch failed; carries the endpoint's failure class.
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] LedgerError),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
