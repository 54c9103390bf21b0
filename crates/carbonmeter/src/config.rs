//! Pipeline configuration.
//!
//! Every tunable lives here and is injected at construction time.
//! There is exactly one source of truth for the daily cap, the sample
//! interval, the accepted cable types, and the grid intensity table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use carbonmeter_core::{CableType, Region};

/// Configuration for the metering pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeterConfig {
    /// Maximum kWh a single device may be credited per calendar day.
    pub daily_cap_kwh: f64,

    /// Fixed sampling interval in seconds. Energy is integrated over
    /// this configured duration, never over anything packet-derived.
    pub sample_interval_secs: f64,

    /// Cable types the processor accepts.
    pub supported_cables: Vec<CableType>,

    /// Region of this deployment; stamped onto every reading and used
    /// to pick the storage bucket.
    pub region: Region,

    /// Grid CO2 intensity overrides in kg per kWh, keyed by region.
    /// Regions absent here fall back to the built-in defaults.
    pub grid_intensity: BTreeMap<Region, f64>,
}

impl MeterConfig {
    /// Whether the given cable type is accepted.
    pub fn supports_cable(&self, cable: CableType) -> bool {
        self.supported_cables.contains(&cable)
    }

    /// Grid CO2 intensity for a region, in kg per kWh.
    pub fn intensity_for(&self, region: Region) -> f64 {
        self.grid_intensity
            .get(&region)
            .copied()
            .unwrap_or_else(|| region.grid_intensity())
    }
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            daily_cap_kwh: 9.0,
            sample_interval_secs: 1.0,
            supported_cables: vec![CableType::TypeC, CableType::TwelveVolt],
            region: Region::Eu,
            grid_intensity: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cable_policy() {
        let config = MeterConfig::default();
        assert!(config.supports_cable(CableType::TypeC));
        assert!(config.supports_cable(CableType::TwelveVolt));
        assert!(!config.supports_cable(CableType::Usb));
    }

    #[test]
    fn test_intensity_fallback_and_override() {
        let mut config = MeterConfig::default();
        assert_eq!(config.intensity_for(Region::Nz), 0.11);

        config.grid_intensity.insert(Region::Nz, 0.09);
        assert_eq!(config.intensity_for(Region::Nz), 0.09);
        assert_eq!(config.intensity_for(Region::Cn), 0.57);
    }
}
