//! The records that flow through the pipeline.
//!
//! `VirPacket` is ephemeral: it exists for the duration of one ingest
//! call. `EnergyReading`, `DeviceBinding`, and `OffsetRecord` are
//! append-only once persisted; nothing in this system mutates a stored
//! record.

use serde::{Deserialize, Serialize};

use crate::crypto::{Ed25519PublicKey, Ed25519Signature};
use crate::types::{CableType, DeviceId, Region, WalletAddress};

/// One signed voltage/current/resistance sample from a metering device.
///
/// Constructed by the transport layer, consumed and discarded by the
/// measurement processor. The signature covers the canonical VIR
/// message (see [`crate::wire::vir_signed_message`]), never this struct's
/// serde encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirPacket {
    pub device_id: DeviceId,
    pub voltage: f64,
    pub current: f64,
    pub resistance: f64,
    /// Unix seconds, claimed by the device.
    pub timestamp: i64,
    pub signature: Ed25519Signature,
}

/// A verified, quota-clamped energy record.
///
/// Created exactly once per accepted packet and never mutated.
/// `verified` is always true: rejected packets produce no reading at
/// all rather than an unverified one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyReading {
    pub device_id: DeviceId,
    pub kwh: f64,
    /// Unix seconds, taken from the packet.
    pub timestamp: i64,
    pub verified: bool,
    pub cable_type: CableType,
    pub region: Region,
}

impl EnergyReading {
    /// The durable-store key for this reading:
    /// `<region-bucket>/<device_id_hex>/<timestamp>`.
    pub fn storage_key(&self) -> String {
        format!(
            "{}/{}/{}",
            self.region.bucket(),
            self.device_id.to_hex(),
            self.timestamp
        )
    }
}

/// A device's request to bind itself to a wallet.
///
/// The signature covers the device id alone (see
/// [`crate::wire::identity_message`]): it proves possession of the key
/// being registered, nothing more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub device_id: DeviceId,
    pub public_key: Ed25519PublicKey,
    pub signature: Ed25519Signature,
    pub wallet_address: WalletAddress,
}

/// The permanent association of one device, one key, and one wallet.
///
/// Write-once: there is no update or revocation path. Each of the three
/// identity fields is globally unique across all bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceBinding {
    pub device_id: DeviceId,
    pub public_key: Ed25519PublicKey,
    pub wallet_address: WalletAddress,
    /// Unix seconds at registration time.
    pub registered_at: i64,
    pub verified: bool,
}

impl DeviceBinding {
    /// The durable-store key for this binding: the device id in hex.
    pub fn storage_key(&self) -> String {
        self.device_id.to_hex()
    }
}

/// A carbon offset derived from a verified reading.
///
/// `co2_kg` is the reading's energy multiplied by the grid intensity of
/// the region it was produced in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetRecord {
    pub device_id: DeviceId,
    pub wallet_address: WalletAddress,
    pub kwh: f64,
    pub co2_kg: f64,
    pub region: Region,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_storage_key_scheme() {
        let reading = EnergyReading {
            device_id: DeviceId::from_bytes([0x01; 32]),
            kwh: 0.5,
            timestamp: 1_000_000_000,
            verified: true,
            cable_type: CableType::TypeC,
            region: Region::Eu,
        };
        let key = reading.storage_key();
        assert!(key.starts_with("ccm-energy-eu/"));
        assert!(key.ends_with("/1000000000"));
        assert!(key.contains(&"01".repeat(32)));
    }

    #[test]
    fn test_reading_serde_roundtrip() {
        let reading = EnergyReading {
            device_id: DeviceId::from_bytes([0x03; 32]),
            kwh: 0.000_005,
            timestamp: 1_700_000_000,
            verified: true,
            cable_type: CableType::TwelveVolt,
            region: Region::Sg,
        };
        let json = serde_json::to_string(&reading).unwrap();
        let back: EnergyReading = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reading);
    }

    #[test]
    fn test_packet_serde_carries_signature() {
        let packet = VirPacket {
            device_id: DeviceId::from_bytes([0x04; 32]),
            voltage: 12.0,
            current: 1.5,
            resistance: 8.0,
            timestamp: 1_700_000_000,
            signature: Ed25519Signature::from_bytes([0x7f; 64]),
        };
        let json = serde_json::to_string(&packet).unwrap();
        let back: VirPacket = serde_json::from_str(&json).unwrap();
        assert_eq!(back.signature, packet.signature);
        assert_eq!(back.device_id, packet.device_id);
    }

    #[test]
    fn test_binding_storage_key_is_device_hex() {
        let binding = DeviceBinding {
            device_id: DeviceId::from_bytes([0xee; 32]),
            public_key: Ed25519PublicKey::from_bytes([0x02; 32]),
            wallet_address: WalletAddress::new("W1").unwrap(),
            registered_at: 0,
            verified: true,
        };
        assert_eq!(binding.storage_key(), "ee".repeat(32));
    }
}
