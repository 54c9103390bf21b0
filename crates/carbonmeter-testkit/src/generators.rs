//! Proptest generators for property-based testing.

use proptest::prelude::*;

use carbonmeter_core::{
    vir_signed_message, CableType, DeviceId, Ed25519PublicKey, Ed25519Signature, Keypair, Region,
    VirPacket, WalletAddress,
};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random DeviceId.
pub fn device_id() -> impl Strategy<Value = DeviceId> {
    any::<[u8; 32]>().prop_map(DeviceId::from_bytes)
}

/// Generate a random Ed25519PublicKey.
pub fn public_key() -> impl Strategy<Value = Ed25519PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a non-empty wallet address.
pub fn wallet_address() -> impl Strategy<Value = WalletAddress> {
    "[A-Za-z0-9]{1,44}".prop_map(|s| WalletAddress::new(s).expect("generated non-empty"))
}

/// Generate a cable type.
pub fn cable_type() -> impl Strategy<Value = CableType> {
    prop_oneof![
        Just(CableType::TypeC),
        Just(CableType::TwelveVolt),
        Just(CableType::Usb),
    ]
}

/// Generate a region.
pub fn region() -> impl Strategy<Value = Region> {
    prop_oneof![
        Just(Region::Eu),
        Just(Region::Sg),
        Just(Region::Nz),
        Just(Region::Cn),
        Just(Region::Other),
    ]
}

/// Generate a plausible voltage in volts.
pub fn voltage() -> impl Strategy<Value = f64> {
    0.0f64..=1000.0
}

/// Generate a plausible current in amps.
pub fn current() -> impl Strategy<Value = f64> {
    0.0f64..=100.0
}

/// Generate a reasonable timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=4_102_444_800 // through 2100
}

/// Parameters for generating a signed packet.
#[derive(Debug, Clone)]
pub struct PacketParams {
    pub keypair: Keypair,
    pub device_id: DeviceId,
    pub voltage: f64,
    pub current: f64,
    pub resistance: f64,
    pub timestamp: i64,
}

impl Arbitrary for PacketParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(), // seed
            device_id(),
            voltage(),
            current(),
            0.0f64..=10_000.0, // resistance
            timestamp(),
        )
            .prop_map(|(seed, device_id, voltage, current, resistance, ts)| PacketParams {
                keypair: Keypair::from_seed(&seed),
                device_id,
                voltage,
                current,
                resistance,
                timestamp: ts,
            })
            .boxed()
    }
}

/// Generate a correctly signed packet from parameters.
pub fn packet_from_params(params: &PacketParams) -> VirPacket {
    let mut packet = VirPacket {
        device_id: params.device_id,
        voltage: params.voltage,
        current: params.current,
        resistance: params.resistance,
        timestamp: params.timestamp,
        signature: Ed25519Signature::ZERO,
    };
    packet.signature = params.keypair.sign(&vir_signed_message(&packet));
    packet
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonmeter_core::{verify_vir_packet, vir_to_kwh};

    proptest! {
        #[test]
        fn test_generated_packets_verify(params: PacketParams) {
            let packet = packet_from_params(&params);
            prop_assert!(verify_vir_packet(&packet, &params.keypair.public_key()));
        }

        #[test]
        fn test_wrong_key_never_verifies(params: PacketParams, other_seed in any::<[u8; 32]>()) {
            prop_assume!(other_seed != params.keypair.seed());

            let packet = packet_from_params(&params);
            let other = Keypair::from_seed(&other_seed);
            prop_assert!(!verify_vir_packet(&packet, &other.public_key()));
        }

        #[test]
        fn test_signed_message_deterministic(params: PacketParams) {
            let p1 = packet_from_params(&params);
            let p2 = packet_from_params(&params);
            prop_assert_eq!(vir_signed_message(&p1), vir_signed_message(&p2));
            prop_assert_eq!(p1.signature, p2.signature);
        }

        #[test]
        fn test_energy_is_non_negative(v in voltage(), i in current(), d in 0.1f64..=3600.0) {
            prop_assert!(vir_to_kwh(v, i, d) >= 0.0);
        }
    }
}
