//! Ledger endpoint abstraction.
//!
//! The endpoint handles payload delivery to the ledger network.
//! Implementations may speak RPC to a real chain node; tests use the
//! in-memory endpoint in [`memory`].

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use carbonmeter_core::WalletAddress;

use crate::error::Result;

/// An opaque reference to a submitted ledger transaction.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionRef(String);

impl TransactionRef {
    /// Wrap a ledger-issued reference string.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionRef({})", self.0)
    }
}

impl fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transport trait for dispatching transactions to the ledger.
///
/// Implementations must be thread-safe (Send + Sync) and must map
/// every failure onto one of the [`crate::LedgerError`] classes; no
/// other fault may escape.
#[async_trait]
pub trait LedgerEndpoint: Send + Sync {
    /// Dispatch one transaction payload, signed by the given wallet.
    ///
    /// Returns the ledger's transaction reference on success.
    async fn submit_transaction(
        &self,
        payload: Bytes,
        signer: &WalletAddress,
    ) -> Result<TransactionRef>;
}

/// A simple in-memory ledger endpoint for testing.
///
/// Records every payload it accepts and can be armed to fail with a
/// chosen failure class.
pub mod memory {
    use super::*;
    use std::sync::Mutex;

    use crate::error::LedgerError;

    /// One accepted submission.
    #[derive(Debug, Clone)]
    pub struct AcceptedSubmission {
        pub payload: Bytes,
        pub signer: WalletAddress,
        pub reference: TransactionRef,
    }

    /// In-memory ledger endpoint implementation.
    #[derive(Default)]
    pub struct MemoryLedger {
        accepted: Mutex<Vec<AcceptedSubmission>>,
        /// When set, the next submissions fail with a clone of this class.
        fail_with: Mutex<Option<FailureClass>>,
    }

    /// Armed failure classes (LedgerError itself is not Clone).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum FailureClass {
        Network,
        Validation,
        Rejected,
    }

    impl MemoryLedger {
        /// Create an empty memory ledger.
        pub fn new() -> Self {
            Self::default()
        }

        /// Arm the endpoint to fail every subsequent submission.
        pub fn fail_with(&self, class: FailureClass) {
            *self.fail_with.lock().unwrap() = Some(class);
        }

        /// Disarm a previously armed failure.
        pub fn heal(&self) {
            *self.fail_with.lock().unwrap() = None;
        }

        /// All submissions accepted so far.
        pub fn accepted(&self) -> Vec<AcceptedSubmission> {
            self.accepted.lock().unwrap().clone()
        }

        /// Number of accepted submissions.
        pub fn accepted_count(&self) -> usize {
            self.accepted.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LedgerEndpoint for MemoryLedger {
        async fn submit_transaction(
            &self,
            payload: Bytes,
            signer: &WalletAddress,
        ) -> Result<TransactionRef> {
            if let Some(class) = *self.fail_with.lock().unwrap() {
                return Err(match class {
                    FailureClass::Network => LedgerError::Network("endpoint unreachable".into()),
                    FailureClass::Validation => {
                        LedgerError::Validation("payload rejected".into())
                    }
                    FailureClass::Rejected => {
                        LedgerError::Rejected("program returned error".into())
                    }
                });
            }

            let mut accepted = self.accepted.lock().unwrap();
            let reference = TransactionRef::new(format!("tx-{:08}", accepted.len() + 1));
            accepted.push(AcceptedSubmission {
                payload,
                signer: signer.clone(),
                reference: reference.clone(),
            });
            Ok(reference)
        }
    }
}
