//! # Carbonmeter Ledger
//!
//! Submission of authenticated energy credits to an external
//! append-only ledger.
//!
//! ## Overview
//!
//! The ledger network itself is out of scope; this crate talks to it
//! through the [`LedgerEndpoint`] trait and owns the two correctness
//! points around it:
//!
//! - **Independent re-verification**: the [`Submitter`] verifies the
//!   device's identity signature itself before any dispatch. It does
//!   not trust that an upstream processor already did.
//! - **Failure classification**: every dispatch failure is caught at
//!   this boundary and surfaced as a typed, coarse class. A bad
//!   submission never panics the pipeline and never escapes
//!   unclassified.
//!
//! ## Key Types
//!
//! - [`LedgerEndpoint`] - async trait for the submission endpoint
//! - [`Submitter`] - re-verify, encode, dispatch
//! - [`TransactionRef`] - opaque reference returned by the ledger
//! - [`MemoryLedger`] - in-memory endpoint for tests

pub mod endpoint;
pub mod error;
pub mod submitter;

pub use endpoint::{
    memory::{FailureClass, MemoryLedger},
    LedgerEndpoint, TransactionRef,
};
pub use error::{LedgerError, SubmitError};
pub use submitter::Submitter;
