//! # Carbonmeter Testkit
//!
//! Testing utilities for the carbonmeter pipeline.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known wire encodings with expected byte-exact outputs
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Simulated devices for setting up test scenarios
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the canonical encodings shared with firmware and
//! the ledger program:
//!
//! ```rust
//! use carbonmeter_testkit::vectors::verify_all_vectors;
//!
//! verify_all_vectors();
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use carbonmeter_testkit::generators::{packet_from_params, PacketParams};
//!
//! proptest! {
//!     #[test]
//!     fn packets_verify(params: PacketParams) {
//!         let packet = packet_from_params(&params);
//!         prop_assert!(carbonmeter::core::verify_vir_packet(
//!             &packet,
//!             &params.keypair.public_key(),
//!         ));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up a simulated device:
//!
//! ```rust
//! use carbonmeter_testkit::fixtures::DeviceFixture;
//!
//! let device = DeviceFixture::new();
//! let packet = device.signed_packet(12.0, 1.5, 1_700_000_000);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{fleet_fixtures, DeviceFixture};
pub use generators::{packet_from_params, PacketParams};
pub use vectors::{
    message_from_vector, message_vectors, payload_from_vector, payload_vectors,
    verify_all_vectors, MessageVector, PayloadVector,
};
