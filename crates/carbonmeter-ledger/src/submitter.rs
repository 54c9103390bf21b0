//! The Submitter: authenticated energy-credit dispatch.
//!
//! Defense in depth: the submitter re-verifies the device's identity
//! signature itself, even when the reading was already verified at
//! ingest. A forged signature is refused before the ledger is ever
//! contacted.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use carbonmeter_core::{
    ledger_payload, verify_device_identity, DeviceId, Ed25519PublicKey, Ed25519Signature,
    WalletAddress,
};

use crate::endpoint::{LedgerEndpoint, TransactionRef};
use crate::error::SubmitError;

/// Submits authenticated energy credits to a ledger endpoint.
///
/// Holds the wallet identity the host signs transactions with; the
/// endpoint and its timeout policy are injected by the caller.
pub struct Submitter<E: LedgerEndpoint> {
    endpoint: Arc<E>,
    wallet: WalletAddress,
}

impl<E: LedgerEndpoint> Submitter<E> {
    /// Create a submitter dispatching through the given endpoint.
    pub fn new(endpoint: Arc<E>, wallet: WalletAddress) -> Self {
        Self { endpoint, wallet }
    }

    /// The wallet this submitter signs with.
    pub fn wallet(&self) -> &WalletAddress {
        &self.wallet
    }

    /// Submit one energy credit to the ledger.
    ///
    /// Verifies `signature` over the device's identity message against
    /// `public_key`; on failure returns [`SubmitError::InvalidSignature`]
    /// without any network traffic. On success, encodes the fixed-layout
    /// payload and dispatches exactly one transaction.
    ///
    /// Every dispatch failure comes back as a typed
    /// [`crate::LedgerError`] class. Whether to retry is the caller's
    /// policy; once dispatched, this component does not cancel.
    pub async fn submit(
        &self,
        device_id: &DeviceId,
        public_key: &Ed25519PublicKey,
        kwh_smallest_unit: u64,
        signature: &Ed25519Signature,
        market_cap: Option<u64>,
    ) -> Result<TransactionRef, SubmitError> {
        if !verify_device_identity(device_id, public_key, signature) {
            warn!(device = %device_id, "refusing submission: identity signature did not verify");
            return Err(SubmitError::InvalidSignature);
        }

        let payload = Bytes::from(ledger_payload(
            device_id,
            kwh_smallest_unit,
            signature,
            market_cap,
        ));

        match self.endpoint.submit_transaction(payload, &self.wallet).await {
            Ok(reference) => {
                debug!(device = %device_id, reference = %reference, "submitted energy credit");
                Ok(reference)
            }
            Err(e) => {
                warn!(device = %device_id, error = %e, "ledger dispatch failed");
                Err(SubmitError::Dispatch(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::memory::{FailureClass, MemoryLedger};
    use crate::error::LedgerError;
    use carbonmeter_core::{identity_message, Keypair};

    fn setup() -> (Keypair, DeviceId, Ed25519Signature, Submitter<MemoryLedger>) {
        let keypair = Keypair::generate();
        let device_id = DeviceId::from_bytes([0x01; 32]);
        let signature = keypair.sign(&identity_message(&device_id));
        let submitter = Submitter::new(
            Arc::new(MemoryLedger::new()),
            WalletAddress::new("host-wallet").unwrap(),
        );
        (keypair, device_id, signature, submitter)
    }

    #[tokio::test]
    async fn test_submit_valid_credit() {
        let (keypair, device_id, signature, submitter) = setup();

        let reference = submitter
            .submit(&device_id, &keypair.public_key(), 5, &signature, None)
            .await
            .unwrap();
        assert!(!reference.as_str().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_signature_never_reaches_ledger() {
        let (keypair, device_id, _, _) = setup();

        let endpoint = Arc::new(MemoryLedger::new());
        let submitter = Submitter::new(
            Arc::clone(&endpoint),
            WalletAddress::new("host-wallet").unwrap(),
        );

        let err = submitter
            .submit(
                &device_id,
                &keypair.public_key(),
                5,
                &Ed25519Signature::ZERO,
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::InvalidSignature));
        assert_eq!(endpoint.accepted_count(), 0);
    }

    #[tokio::test]
    async fn test_payload_layout_on_the_wire() {
        let (keypair, device_id, signature, _) = setup();

        let endpoint = Arc::new(MemoryLedger::new());
        let submitter = Submitter::new(
            Arc::clone(&endpoint),
            WalletAddress::new("host-wallet").unwrap(),
        );

        submitter
            .submit(
                &device_id,
                &keypair.public_key(),
                1_000,
                &signature,
                Some(42),
            )
            .await
            .unwrap();

        let accepted = endpoint.accepted();
        assert_eq!(accepted.len(), 1);
        let payload = &accepted[0].payload;
        assert_eq!(payload.len(), 32 + 8 + 64 + 8);
        assert_eq!(&payload[..32], device_id.as_bytes());
        assert_eq!(&payload[32..40], &1_000u64.to_le_bytes());
        assert_eq!(&payload[40..104], signature.as_bytes());
        assert_eq!(&payload[104..112], &42u64.to_le_bytes());
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_classified() {
        let (keypair, device_id, signature, _) = setup();

        let endpoint = Arc::new(MemoryLedger::new());
        endpoint.fail_with(FailureClass::Rejected);
        let submitter = Submitter::new(
            Arc::clone(&endpoint),
            WalletAddress::new("host-wallet").unwrap(),
        );

        let err = submitter
            .submit(&device_id, &keypair.public_key(), 5, &signature, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SubmitError::Dispatch(LedgerError::Rejected(_))
        ));
    }
}
