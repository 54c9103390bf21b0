//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use carbonmeter_core::{
    identity_message, vir_signed_message, DeviceId, Ed25519PublicKey, Ed25519Signature, Keypair,
    RegistrationRequest, VirPacket, WalletAddress,
};
use carbonmeter_store::MemoryStore;

/// A simulated meter device: a keypair, its device id, and a store to
/// ingest into. The store is shared so a test can hand clones of it to
/// the binder, processor, and assertions.
pub struct DeviceFixture {
    pub keypair: Keypair,
    pub device_id: DeviceId,
    pub store: Arc<MemoryStore>,
}

impl DeviceFixture {
    /// Create a fixture with a random keypair and a random device id.
    pub fn new() -> Self {
        let keypair = Keypair::generate();
        let device_id = DeviceId::from_bytes(rand::random());
        Self {
            keypair,
            device_id,
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Create with a deterministic keypair and device id from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
            device_id: DeviceId::from_bytes(seed),
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Get the keypair's public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    /// Sign the device's identity message.
    pub fn identity_signature(&self) -> Ed25519Signature {
        self.keypair.sign(&identity_message(&self.device_id))
    }

    /// Create a correctly signed telemetry packet.
    pub fn signed_packet(&self, voltage: f64, current: f64, timestamp: i64) -> VirPacket {
        let mut packet = VirPacket {
            device_id: self.device_id,
            voltage,
            current,
            resistance: if current != 0.0 { voltage / current } else { 0.0 },
            timestamp,
            signature: Ed25519Signature::ZERO,
        };
        packet.signature = self.keypair.sign(&vir_signed_message(&packet));
        packet
    }

    /// Create a packet whose signature will not verify.
    pub fn tampered_packet(&self, voltage: f64, current: f64, timestamp: i64) -> VirPacket {
        let mut packet = self.signed_packet(voltage, current, timestamp);
        packet.voltage += 1.0;
        packet
    }

    /// Create a registration request binding this device to `wallet`.
    pub fn registration(&self, wallet: &str) -> RegistrationRequest {
        RegistrationRequest {
            device_id: self.device_id,
            public_key: self.public_key(),
            signature: self.identity_signature(),
            wallet_address: WalletAddress::new(wallet).expect("non-empty wallet"),
        }
    }
}

impl Default for DeviceFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple device fixtures for fleet tests.
pub fn fleet_fixtures(count: usize) -> Vec<DeviceFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[1] = 0x5a;
            DeviceFixture::with_seed(seed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonmeter_core::{verify_device_identity, verify_vir_packet};

    #[test]
    fn test_signed_packet_verifies() {
        let fixture = DeviceFixture::with_seed([0x42; 32]);
        let packet = fixture.signed_packet(12.0, 1.5, 1_700_000_000);
        assert!(verify_vir_packet(&packet, &fixture.public_key()));
    }

    #[test]
    fn test_tampered_packet_does_not_verify() {
        let fixture = DeviceFixture::with_seed([0x42; 32]);
        let packet = fixture.tampered_packet(12.0, 1.5, 1_700_000_000);
        assert!(!verify_vir_packet(&packet, &fixture.public_key()));
    }

    #[test]
    fn test_registration_verifies() {
        let fixture = DeviceFixture::with_seed([0x42; 32]);
        let request = fixture.registration("W1");
        assert!(verify_device_identity(
            &request.device_id,
            &request.public_key,
            &request.signature
        ));
    }

    #[test]
    fn test_fleet_has_unique_keys() {
        let fleet = fleet_fixtures(3);
        let pks: Vec<_> = fleet.iter().map(|d| d.public_key()).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);
    }
}
