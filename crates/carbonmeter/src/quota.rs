//! Per-device, per-day quota enforcement.
//!
//! The quota decision and the running-total mutation happen under one
//! lock: there is no observable state between "checked" and "charged".
//! A granted amount is a reservation; if the durable write that follows
//! it fails, the caller releases the reservation so a failed write
//! never burns quota.

use std::collections::HashMap;
use std::sync::Mutex;

use carbonmeter_core::DeviceId;

/// A granted quota reservation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Credit {
    /// The kWh actually credited (may be less than proposed).
    pub kwh: f64,
    /// Whether the proposal was clamped to fit under the cap.
    pub clamped: bool,
}

/// Outcome of a quota application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuotaDecision {
    /// Some credit was granted and charged to the device-day.
    Granted(Credit),
    /// No credit remains for this device-day; usage is unchanged.
    Exhausted,
}

/// Tracks accumulated kWh per (device, day bucket).
///
/// Old day buckets are never read again once the day advances; they are
/// retained but dead. Eviction is an implementation freedom the current
/// implementation does not exercise.
pub struct QuotaLedger {
    usage: Mutex<HashMap<(DeviceId, i64), f64>>,
}

impl QuotaLedger {
    /// Create an empty quota ledger.
    pub fn new() -> Self {
        Self {
            usage: Mutex::new(HashMap::new()),
        }
    }

    /// Apply a proposed credit against the cap for a device-day.
    ///
    /// Accepts the full proposal when it fits; otherwise clamps to the
    /// remaining headroom (partial credit is deliberate policy). When
    /// nothing fits, the decision is [`QuotaDecision::Exhausted`] and
    /// usage stays untouched. A clamped accept records usage as exactly
    /// the cap.
    pub fn apply(
        &self,
        device_id: DeviceId,
        day_bucket: i64,
        proposed_kwh: f64,
        cap: f64,
    ) -> QuotaDecision {
        let mut usage = self.usage.lock().unwrap();
        let used = usage.entry((device_id, day_bucket)).or_insert(0.0);

        if *used + proposed_kwh <= cap {
            *used += proposed_kwh;
            return QuotaDecision::Granted(Credit {
                kwh: proposed_kwh,
                clamped: false,
            });
        }

        let remaining = (cap - *used).max(0.0);
        if remaining <= 0.0 {
            return QuotaDecision::Exhausted;
        }

        *used = cap;
        QuotaDecision::Granted(Credit {
            kwh: remaining,
            clamped: true,
        })
    }

    /// Release a previously granted reservation.
    ///
    /// Used when the durable write after a grant fails; usage floors at
    /// zero.
    pub fn release(&self, device_id: DeviceId, day_bucket: i64, kwh: f64) {
        let mut usage = self.usage.lock().unwrap();
        if let Some(used) = usage.get_mut(&(device_id, day_bucket)) {
            *used = (*used - kwh).max(0.0);
        }
    }

    /// Accumulated kWh for a device-day (0 if never charged).
    pub fn used(&self, device_id: DeviceId, day_bucket: i64) -> f64 {
        let usage = self.usage.lock().unwrap();
        usage.get(&(device_id, day_bucket)).copied().unwrap_or(0.0)
    }
}

impl Default for QuotaLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE: DeviceId = DeviceId::from_bytes([0x01; 32]);
    const DAY: i64 = 11_574;

    #[test]
    fn test_full_accept_under_cap() {
        let quota = QuotaLedger::new();
        let decision = quota.apply(DEVICE, DAY, 1.0, 9.0);
        assert_eq!(
            decision,
            QuotaDecision::Granted(Credit {
                kwh: 1.0,
                clamped: false
            })
        );
        assert_eq!(quota.used(DEVICE, DAY), 1.0);
    }

    #[test]
    fn test_partial_credit_clamps_to_cap_exactly() {
        let quota = QuotaLedger::new();
        assert!(matches!(
            quota.apply(DEVICE, DAY, 8.5, 9.0),
            QuotaDecision::Granted(_)
        ));

        // 8.5 used, 1.0 proposed: exactly 0.5 credited, usage lands on
        // 9.0, not 9.5.
        match quota.apply(DEVICE, DAY, 1.0, 9.0) {
            QuotaDecision::Granted(credit) => {
                assert!((credit.kwh - 0.5).abs() < 1e-12);
                assert!(credit.clamped);
            }
            other => panic!("expected partial grant, got {:?}", other),
        }
        assert_eq!(quota.used(DEVICE, DAY), 9.0);
    }

    #[test]
    fn test_exhausted_at_cap_leaves_usage_unchanged() {
        let quota = QuotaLedger::new();
        quota.apply(DEVICE, DAY, 9.0, 9.0);
        assert_eq!(quota.used(DEVICE, DAY), 9.0);

        assert_eq!(quota.apply(DEVICE, DAY, 0.1, 9.0), QuotaDecision::Exhausted);
        assert_eq!(quota.used(DEVICE, DAY), 9.0);
    }

    #[test]
    fn test_buckets_are_independent() {
        let quota = QuotaLedger::new();
        quota.apply(DEVICE, DAY, 9.0, 9.0);

        // Next day starts fresh.
        assert!(matches!(
            quota.apply(DEVICE, DAY + 1, 1.0, 9.0),
            QuotaDecision::Granted(_)
        ));

        // Another device on the same day is unaffected.
        let other = DeviceId::from_bytes([0x02; 32]);
        assert!(matches!(
            quota.apply(other, DAY, 1.0, 9.0),
            QuotaDecision::Granted(_)
        ));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn usage_never_exceeds_cap(
                proposals in prop::collection::vec(0.0f64..3.0, 0..50)
            ) {
                let quota = QuotaLedger::new();
                for proposed in proposals {
                    let _ = quota.apply(DEVICE, DAY, proposed, 9.0);
                    prop_assert!(quota.used(DEVICE, DAY) <= 9.0 + 1e-9);
                }
            }

            #[test]
            fn granted_credit_never_exceeds_proposal(
                used_before in 0.0f64..9.0,
                proposed in 0.0f64..3.0,
            ) {
                let quota = QuotaLedger::new();
                quota.apply(DEVICE, DAY, used_before, 9.0);
                if let QuotaDecision::Granted(credit) =
                    quota.apply(DEVICE, DAY, proposed, 9.0)
                {
                    prop_assert!(credit.kwh <= proposed + 1e-12);
                    prop_assert!(credit.kwh > 0.0 || proposed == 0.0);
                }
            }
        }
    }

    #[test]
    fn test_release_backs_out_reservation() {
        let quota = QuotaLedger::new();
        quota.apply(DEVICE, DAY, 2.0, 9.0);
        quota.release(DEVICE, DAY, 2.0);
        assert_eq!(quota.used(DEVICE, DAY), 0.0);

        // Releasing more than was charged floors at zero.
        quota.apply(DEVICE, DAY, 1.0, 9.0);
        quota.release(DEVICE, DAY, 5.0);
        assert_eq!(quota.used(DEVICE, DAY), 0.0);
    }
}
