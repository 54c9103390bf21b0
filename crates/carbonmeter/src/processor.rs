//! The measurement processor: verify → convert → clamp → persist.
//!
//! One packet in, at most one reading out. Every rejection path
//! produces zero durable writes and zero quota mutation; the quota
//! reservation taken before the durable write is released again if that
//! write fails.

use std::sync::Arc;

use tracing::{debug, warn};

use carbonmeter_core::{
    day_bucket, verify_vir_packet, vir_to_kwh, CableType, DeviceId, Ed25519PublicKey,
    EnergyReading, VirPacket,
};
use carbonmeter_store::{InsertResult, Store, StoreError};

use crate::config::MeterConfig;
use crate::error::{MeterError, RejectionReason, Result};
use crate::quota::{QuotaDecision, QuotaLedger};

/// Orchestrates ingestion of signed telemetry packets.
///
/// Owns the daily-usage table for the lifetime of the process; the
/// durable store owns readings once they are inserted.
pub struct MeasurementProcessor<S: Store> {
    store: Arc<S>,
    config: MeterConfig,
    quota: QuotaLedger,
}

impl<S: Store> MeasurementProcessor<S> {
    /// Create a processor over the given store and configuration.
    pub fn new(store: Arc<S>, config: MeterConfig) -> Self {
        Self {
            store,
            config,
            quota: QuotaLedger::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Accumulated kWh credited to a device for the day containing
    /// `timestamp`.
    pub fn usage_for(&self, device_id: DeviceId, timestamp: i64) -> f64 {
        self.quota.used(device_id, day_bucket(timestamp))
    }

    /// Process one telemetry packet.
    ///
    /// Pipeline per packet: transport policy → signature → conversion →
    /// quota → persist. The first failing step rejects the packet and
    /// nothing downstream of it runs. The returned reading carries the
    /// quota-clamped kWh, which may be less than the packet's raw
    /// energy.
    pub async fn process(
        &self,
        packet: &VirPacket,
        public_key: &Ed25519PublicKey,
        cable_type: CableType,
    ) -> Result<EnergyReading> {
        // 1. Transport policy.
        if !self.config.supports_cable(cable_type) {
            debug!(device = %packet.device_id, cable = %cable_type, "rejecting: unsupported cable");
            return Err(RejectionReason::UnsupportedTransport(cable_type).into());
        }

        // 2. Authenticity.
        if !verify_vir_packet(packet, public_key) {
            debug!(device = %packet.device_id, "rejecting: signature did not verify");
            return Err(RejectionReason::InvalidSignature.into());
        }

        // 3. Energy over the configured sample interval, never over
        //    anything the packet claims about duration.
        let proposed_kwh = vir_to_kwh(
            packet.voltage,
            packet.current,
            self.config.sample_interval_secs,
        );

        // 4. Daily cap. A grant is a reservation until the write lands.
        let bucket = day_bucket(packet.timestamp);
        let credit = match self.quota.apply(
            packet.device_id,
            bucket,
            proposed_kwh,
            self.config.daily_cap_kwh,
        ) {
            QuotaDecision::Granted(credit) => credit,
            QuotaDecision::Exhausted => {
                debug!(device = %packet.device_id, bucket, "rejecting: quota exhausted");
                return Err(RejectionReason::QuotaExhausted.into());
            }
        };

        // 5. Persist. Unverified readings are never constructed.
        let reading = EnergyReading {
            device_id: packet.device_id,
            kwh: credit.kwh,
            timestamp: packet.timestamp,
            verified: true,
            cable_type,
            region: self.config.region,
        };

        match self.store.insert_reading(&reading).await {
            Ok(InsertResult::Inserted) => {
                debug!(
                    device = %reading.device_id,
                    kwh = reading.kwh,
                    clamped = credit.clamped,
                    "reading accepted"
                );
                Ok(reading)
            }
            Ok(InsertResult::AlreadyExists) => {
                // Replay of an already-captured packet: no new durable
                // write happened, so the reservation is returned.
                self.quota.release(packet.device_id, bucket, credit.kwh);
                debug!(device = %reading.device_id, "duplicate packet, reading already stored");
                Ok(reading)
            }
            Ok(InsertResult::Conflict) => {
                self.quota.release(packet.device_id, bucket, credit.kwh);
                warn!(device = %reading.device_id, ts = reading.timestamp, "conflicting reading at same timestamp");
                Err(MeterError::Store(StoreError::Conflict {
                    field: "reading",
                    value: reading.storage_key(),
                }))
            }
            Err(e) => {
                self.quota.release(packet.device_id, bucket, credit.kwh);
                warn!(device = %reading.device_id, error = %e, "store write failed, reservation released");
                Err(e.into())
            }
        }
    }
}
