//! Canonical wire encodings.
//!
//! These layouts are cross-implementation contracts shared with device
//! firmware and the ledger program. Field order and widths are fixed;
//! any change breaks signature verification against deployed devices.
//!
//! - VIR signed message: `device_id[32] || voltage_le_f32[4] ||
//!   current_le_f32[4] || resistance_le_f32[4] || timestamp_le_i64[8]`
//! - Identity message (registration, ledger re-verification):
//!   `device_id[32]`
//! - Ledger payload: `device_id[32] || kwh_le_u64[8] || signature[64]
//!   || market_cap_le_u64[8]?`
//!
//! Electrical values travel as 32-bit floats: the firmware packs f32,
//! so verification is over the f32 image of the packet's f64 fields.

use crate::crypto::{Ed25519PublicKey, Ed25519Signature};
use crate::records::VirPacket;
use crate::types::DeviceId;

/// Length of the canonical VIR signed message.
pub const VIR_MESSAGE_LEN: usize = 32 + 4 + 4 + 4 + 8;

/// Length of the ledger payload without the optional market cap.
pub const LEDGER_PAYLOAD_LEN: usize = 32 + 8 + 64;

/// Build the canonical signed message for a VIR packet.
pub fn vir_signed_message(packet: &VirPacket) -> Vec<u8> {
    let mut buf = Vec::with_capacity(VIR_MESSAGE_LEN);
    buf.extend_from_slice(packet.device_id.as_bytes());
    buf.extend_from_slice(&(packet.voltage as f32).to_le_bytes());
    buf.extend_from_slice(&(packet.current as f32).to_le_bytes());
    buf.extend_from_slice(&(packet.resistance as f32).to_le_bytes());
    buf.extend_from_slice(&packet.timestamp.to_le_bytes());
    buf
}

/// Build the canonical identity message: the device id alone.
///
/// Signed at registration to prove possession of the registered key,
/// and re-verified independently before every ledger submission.
pub fn identity_message(device_id: &DeviceId) -> Vec<u8> {
    device_id.as_bytes().to_vec()
}

/// Build the ledger submission payload.
///
/// The trailing market-cap field is present only when supplied; the
/// ledger program distinguishes the two layouts by length.
pub fn ledger_payload(
    device_id: &DeviceId,
    kwh_smallest_unit: u64,
    signature: &Ed25519Signature,
    market_cap: Option<u64>,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(LEDGER_PAYLOAD_LEN + 8);
    buf.extend_from_slice(device_id.as_bytes());
    buf.extend_from_slice(&kwh_smallest_unit.to_le_bytes());
    buf.extend_from_slice(signature.as_bytes());
    if let Some(cap) = market_cap {
        buf.extend_from_slice(&cap.to_le_bytes());
    }
    buf
}

/// Verify a VIR packet's signature against the claimed device key.
///
/// Malformed keys fold into `false`; this is the pipeline's uniform
/// rejection signal.
pub fn verify_vir_packet(packet: &VirPacket, public_key: &Ed25519PublicKey) -> bool {
    let message = vir_signed_message(packet);
    public_key.verifies(&message, &packet.signature)
}

/// Verify a signature over a device's identity message.
pub fn verify_device_identity(
    device_id: &DeviceId,
    public_key: &Ed25519PublicKey,
    signature: &Ed25519Signature,
) -> bool {
    let message = identity_message(device_id);
    public_key.verifies(&message, signature)
}
