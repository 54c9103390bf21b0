//! Carbon offset accounting over verified readings.

use std::sync::Arc;

use tracing::debug;

use carbonmeter_core::{EnergyReading, OffsetRecord, Region, WalletAddress};
use carbonmeter_store::Store;

use crate::config::MeterConfig;
use crate::error::Result;

/// Converts credited energy into CO2 offset records.
///
/// Offsets are append-only: every call produces a new record, keyed to
/// the reading's device and timestamp. Amounts are rounded to whole
/// grams (two decimal places of kg) at record time so stored totals
/// match what is reported.
pub struct OffsetEngine<S: Store> {
    store: Arc<S>,
    config: MeterConfig,
}

impl<S: Store> OffsetEngine<S> {
    pub fn new(store: Arc<S>, config: MeterConfig) -> Self {
        Self { store, config }
    }

    /// CO2 in kg offset by `kwh` of clean generation in `region`,
    /// rounded to two decimal places.
    pub fn co2_for(&self, kwh: f64, region: Region) -> f64 {
        let raw = kwh * self.config.intensity_for(region);
        (raw * 100.0).round() / 100.0
    }

    /// Record the offset earned by a verified reading, credited to the
    /// owning wallet.
    pub async fn record(
        &self,
        reading: &EnergyReading,
        wallet: &WalletAddress,
    ) -> Result<OffsetRecord> {
        let record = OffsetRecord {
            device_id: reading.device_id,
            wallet_address: wallet.clone(),
            kwh: reading.kwh,
            co2_kg: self.co2_for(reading.kwh, reading.region),
            region: reading.region,
            timestamp: reading.timestamp,
        };
        self.store.insert_offset(&record).await?;
        debug!(
            device = %record.device_id,
            co2_kg = record.co2_kg,
            region = %record.region,
            "offset recorded"
        );
        Ok(record)
    }
}
