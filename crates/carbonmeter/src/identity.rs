//! Device identity binding: one device, one key, one wallet, forever.
//!
//! Registration is write-once. The three uniqueness checks and the
//! insert serialize through a single registration lock, so two
//! concurrent requests for the same wallet cannot both pass the check;
//! the store's own constraints back this up underneath.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use carbonmeter_core::{
    verify_device_identity, DeviceBinding, DeviceId, RegistrationRequest, WalletAddress,
};
use carbonmeter_store::Store;

use crate::error::{RegistrationError, Result};

/// Enforces the 1:1:1 device/key/wallet binding.
pub struct IdentityBinder<S: Store> {
    store: Arc<S>,
    /// Serializes check-then-insert across concurrent registrations.
    registration_lock: Mutex<()>,
}

impl<S: Store> IdentityBinder<S> {
    /// Create a binder over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            registration_lock: Mutex::new(()),
        }
    }

    /// Register a device.
    ///
    /// Checks run in a fixed order, first failure wins: signature over
    /// the device id, then device, key, and wallet uniqueness. On
    /// success the binding is persisted with the current time and is
    /// immutable from then on. Re-submitting an identical request after
    /// success fails with [`RegistrationError::DeviceAlreadyRegistered`].
    pub async fn register(&self, request: &RegistrationRequest) -> Result<DeviceBinding> {
        if !verify_device_identity(&request.device_id, &request.public_key, &request.signature) {
            debug!(device = %request.device_id, "registration rejected: bad signature");
            return Err(RegistrationError::InvalidSignature.into());
        }

        let _guard = self.registration_lock.lock().await;

        if self.store.get_binding(&request.device_id).await?.is_some() {
            return Err(RegistrationError::DeviceAlreadyRegistered.into());
        }

        if self
            .store
            .find_device_for_key(&request.public_key)
            .await?
            .is_some()
        {
            return Err(RegistrationError::KeyAlreadyRegistered.into());
        }

        if self.store.is_wallet_bound(&request.wallet_address).await? {
            return Err(RegistrationError::WalletAlreadyBound.into());
        }

        let binding = DeviceBinding {
            device_id: request.device_id,
            public_key: request.public_key,
            wallet_address: request.wallet_address.clone(),
            registered_at: now_secs(),
            verified: true,
        };

        self.store.insert_binding(&binding).await?;
        info!(device = %binding.device_id, wallet = %binding.wallet_address, "device registered");
        Ok(binding)
    }

    /// Look up the binding for a device.
    pub async fn lookup(&self, device_id: &DeviceId) -> Result<Option<DeviceBinding>> {
        Ok(self.store.get_binding(device_id).await?)
    }

    /// Whether a wallet address is already bound.
    pub async fn is_wallet_bound(&self, wallet: &WalletAddress) -> Result<bool> {
        Ok(self.store.is_wallet_bound(wallet).await?)
    }
}

/// Current time in unix seconds.
fn now_secs() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_secs() as i64
}
