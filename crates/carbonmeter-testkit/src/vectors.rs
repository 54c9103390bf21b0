//! Golden test vectors for the canonical wire encodings.
//!
//! These vectors pin the exact byte layouts shared with device firmware
//! and the ledger program. Every implementation must reproduce them
//! bit for bit.

use carbonmeter_core::{
    ledger_payload, vir_signed_message, DeviceId, Ed25519Signature, VirPacket,
};

/// A golden vector for the VIR signed message.
#[derive(Debug, Clone)]
pub struct MessageVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Device id byte, repeated 32 times.
    pub device_byte: u8,
    pub voltage: f64,
    pub current: f64,
    pub resistance: f64,
    pub timestamp: i64,
    /// Expected canonical message (hex, 52 bytes).
    pub expected_message: &'static str,
}

/// A golden vector for the ledger submission payload.
#[derive(Debug, Clone)]
pub struct PayloadVector {
    pub name: &'static str,
    /// Device id byte, repeated 32 times.
    pub device_byte: u8,
    pub kwh_smallest_unit: u64,
    /// Signature byte, repeated 64 times.
    pub signature_byte: u8,
    pub market_cap: Option<u64>,
    /// Expected payload (hex, 104 or 112 bytes).
    pub expected_payload: &'static str,
}

/// All VIR message vectors.
pub fn message_vectors() -> Vec<MessageVector> {
    vec![
        MessageVector {
            name: "typical sample",
            device_byte: 0x01,
            voltage: 12.0,
            current: 1.5,
            resistance: 8.0,
            timestamp: 1_000_000_000,
            expected_message: concat!(
                "0101010101010101010101010101010101010101010101010101010101010101",
                "000040410000c03f0000004100ca9a3b00000000",
            ),
        },
        MessageVector {
            name: "all zero",
            device_byte: 0x00,
            voltage: 0.0,
            current: 0.0,
            resistance: 0.0,
            timestamp: 0,
            expected_message: concat!(
                "0000000000000000000000000000000000000000000000000000000000000000",
                "0000000000000000000000000000000000000000",
            ),
        },
        MessageVector {
            name: "negative fields",
            device_byte: 0xff,
            voltage: -1.0,
            current: 2.5,
            resistance: -0.5,
            timestamp: -1,
            expected_message: concat!(
                "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
                "000080bf00002040000000bfffffffffffffffff",
            ),
        },
    ]
}

/// All ledger payload vectors.
pub fn payload_vectors() -> Vec<PayloadVector> {
    vec![
        PayloadVector {
            name: "no market cap",
            device_byte: 0x01,
            kwh_smallest_unit: 5,
            signature_byte: 0xab,
            market_cap: None,
            expected_payload: concat!(
                "0101010101010101010101010101010101010101010101010101010101010101",
                "0500000000000000",
                "abababababababababababababababababababababababababababababababab",
                "abababababababababababababababababababababababababababababababab",
            ),
        },
        PayloadVector {
            name: "with market cap",
            device_byte: 0x01,
            kwh_smallest_unit: 5,
            signature_byte: 0xab,
            market_cap: Some(1_000_000),
            expected_payload: concat!(
                "0101010101010101010101010101010101010101010101010101010101010101",
                "0500000000000000",
                "abababababababababababababababababababababababababababababababab",
                "abababababababababababababababababababababababababababababababab",
                "40420f0000000000",
            ),
        },
    ]
}

/// Build the canonical message for a vector.
pub fn message_from_vector(vector: &MessageVector) -> Vec<u8> {
    let packet = VirPacket {
        device_id: DeviceId::from_bytes([vector.device_byte; 32]),
        voltage: vector.voltage,
        current: vector.current,
        resistance: vector.resistance,
        timestamp: vector.timestamp,
        signature: Ed25519Signature::ZERO,
    };
    vir_signed_message(&packet)
}

/// Build the ledger payload for a vector.
pub fn payload_from_vector(vector: &PayloadVector) -> Vec<u8> {
    ledger_payload(
        &DeviceId::from_bytes([vector.device_byte; 32]),
        vector.kwh_smallest_unit,
        &Ed25519Signature::from_bytes([vector.signature_byte; 64]),
        vector.market_cap,
    )
}

/// Check every vector against its expected hex. Panics on mismatch.
pub fn verify_all_vectors() {
    for v in message_vectors() {
        assert_eq!(
            hex::encode(message_from_vector(&v)),
            v.expected_message,
            "message vector mismatch: {}",
            v.name
        );
    }
    for v in payload_vectors() {
        assert_eq!(
            hex::encode(payload_from_vector(&v)),
            v.expected_payload,
            "payload vector mismatch: {}",
            v.name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonmeter_core::wire::{LEDGER_PAYLOAD_LEN, VIR_MESSAGE_LEN};

    #[test]
    fn test_all_vectors_match() {
        verify_all_vectors();
    }

    #[test]
    fn test_vector_lengths() {
        for v in message_vectors() {
            assert_eq!(message_from_vector(&v).len(), VIR_MESSAGE_LEN, "{}", v.name);
        }
        for v in payload_vectors() {
            let expect = match v.market_cap {
                Some(_) => LEDGER_PAYLOAD_LEN + 8,
                None => LEDGER_PAYLOAD_LEN,
            };
            assert_eq!(payload_from_vector(&v).len(), expect, "{}", v.name);
        }
    }

    #[test]
    fn test_vectors_deterministic() {
        for v in message_vectors() {
            assert_eq!(message_from_vector(&v), message_from_vector(&v));
        }
    }
}
