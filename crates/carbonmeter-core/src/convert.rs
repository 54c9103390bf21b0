//! Electrical-sample to energy conversion.
//!
//! Pure arithmetic, no validation: the converter accepts whatever the
//! packet carried, including non-physical negative values. Plausibility
//! policy belongs to the processor, not here.

/// Convert a voltage/current sample over a duration into kilowatt-hours.
///
/// `P = V * I` watts, integrated over `duration_secs`, expressed in kWh:
///
/// ```text
/// kwh = voltage * current * duration_secs / 3600 / 1000
/// ```
///
/// Total and monotonic in each argument for non-negative inputs.
pub fn vir_to_kwh(voltage: f64, current: f64, duration_secs: f64) -> f64 {
    let power_watts = voltage * current;
    let energy_wh = power_watts * (duration_secs / 3600.0);
    energy_wh / 1000.0
}

/// Convert kWh to the ledger's integer sub-unit (micro-kWh).
///
/// The ledger payload carries energy as a u64; micro-kWh keeps
/// single-second samples representable. Negative energy clamps to zero
/// since the ledger cannot be debited.
pub fn kwh_to_micro(kwh: f64) -> u64 {
    let micro = (kwh * 1_000_000.0).round();
    if micro <= 0.0 {
        0
    } else {
        micro as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_hour_at_twelve_volts() {
        // 12W for 3600s = 12 Wh = 0.012 kWh, i.e. v * i / 1000 when the
        // duration is exactly one hour.
        let kwh = vir_to_kwh(12.0, 1.0, 3600.0);
        assert!((kwh - 0.012).abs() < 1e-12);
        assert!((kwh - 12.0 * 1.0 / 1000.0).abs() < 1e-12);
    }

    #[test]
    fn test_kilowatt_scale() {
        // 1000W for one hour = 1 kWh.
        let kwh = vir_to_kwh(100.0, 10.0, 3600.0);
        assert!((kwh - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_one_second_sample() {
        // The production sample interval: 12V * 1.5A for 1s.
        let kwh = vir_to_kwh(12.0, 1.5, 1.0);
        assert!((kwh - 0.000_005).abs() < 1e-12);
    }

    #[test]
    fn test_zero_duration_is_zero_energy() {
        assert_eq!(vir_to_kwh(230.0, 16.0, 0.0), 0.0);
    }

    #[test]
    fn test_negative_inputs_pass_through() {
        // Permissive by design; the converter does no domain validation.
        assert!(vir_to_kwh(-12.0, 1.0, 3600.0) < 0.0);
    }

    #[test]
    fn test_micro_conversion() {
        assert_eq!(kwh_to_micro(0.000_005), 5);
        assert_eq!(kwh_to_micro(1.0), 1_000_000);
        assert_eq!(kwh_to_micro(-0.5), 0);
        assert_eq!(kwh_to_micro(0.0), 0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn non_negative_inputs_yield_non_negative_energy(
                v in 0.0f64..=1000.0,
                i in 0.0f64..=100.0,
                d in 0.0f64..=86_400.0,
            ) {
                prop_assert!(vir_to_kwh(v, i, d) >= 0.0);
            }

            #[test]
            fn monotonic_in_duration(
                v in 0.1f64..=1000.0,
                i in 0.1f64..=100.0,
                d in 0.0f64..=3600.0,
            ) {
                prop_assert!(vir_to_kwh(v, i, d + 1.0) > vir_to_kwh(v, i, d));
            }

            #[test]
            fn micro_never_underflows(kwh in -10.0f64..=10.0) {
                let micro = kwh_to_micro(kwh);
                if kwh <= 0.0 {
                    prop_assert_eq!(micro, 0);
                }
            }
        }
    }
}
