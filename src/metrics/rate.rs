use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// One derived rate sample. `value` is already in the channel's display
/// unit; `at_secs` counts seconds since the collector started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePoint {
    pub at_secs: f64,
    pub value: f64,
}

/// What to do when a cumulative counter goes backwards (driver reload,
/// interface reset, kernel counter wrap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetPolicy {
    /// Drop the tick and start a fresh baseline.
    #[default]
    Rebaseline,
    /// Report a zero rate for the tick, then start a fresh baseline.
    ClampZero,
}

impl ResetPolicy {
    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "clamp" | "clamp_zero" | "zero" => ResetPolicy::ClampZero,
            _ => ResetPolicy::Rebaseline,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Baseline {
    at_secs: f64,
    value: u64,
}

/// Converts pairs of (cumulative counter, timestamp) samples into
/// instantaneous per-second rates.
///
/// Keeps one baseline per (entity, counter) pair. The first sample for a
/// pair only establishes the baseline; no rate is emitted for it, which
/// avoids a spurious spike at startup.
#[derive(Debug)]
pub struct RateCalculator {
    baselines: HashMap<String, HashMap<&'static str, Baseline>>,
    policy: ResetPolicy,
}

impl RateCalculator {
    pub fn new(policy: ResetPolicy) -> Self {
        Self {
            baselines: HashMap::new(),
            policy,
        }
    }

    /// Derive a per-second rate for one counter of one entity.
    ///
    /// Returns `None` on the first sample, on a non-positive time delta
    /// (duplicate sample or non-monotonic clock) and, under
    /// `ResetPolicy::Rebaseline`, when the counter went backwards.
    pub fn compute(
        &mut self,
        entity: &str,
        counter: &'static str,
        at_secs: f64,
        value: u64,
    ) -> Option<RatePoint> {
        let fresh = Baseline { at_secs, value };

        if !self.baselines.contains_key(entity) {
            self.baselines.insert(entity.to_string(), HashMap::new());
        }
        let per_entity = self
            .baselines
            .get_mut(entity)
            .expect("entity baseline map just ensured");

        let base = match per_entity.entry(counter) {
            Entry::Vacant(slot) => {
                slot.insert(fresh);
                return None;
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        let delta_t = at_secs - base.at_secs;
        if delta_t <= 0.0 {
            // Duplicate sample or a clock that stepped backwards. Keep the
            // existing baseline; the next well-ordered sample recovers.
            return None;
        }

        if value < base.value {
            *base = fresh;
            return match self.policy {
                ResetPolicy::Rebaseline => None,
                ResetPolicy::ClampZero => Some(RatePoint {
                    at_secs,
                    value: 0.0,
                }),
            };
        }

        let rate = (value - base.value) as f64 / delta_t;
        *base = fresh;
        Some(RatePoint {
            at_secs,
            value: rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc() -> RateCalculator {
        RateCalculator::new(ResetPolicy::Rebaseline)
    }

    #[test]
    fn first_sample_yields_no_rate() {
        let mut rc = calc();
        assert_eq!(rc.compute("eth0", "rx", 0.0, 1_000_000), None);
    }

    #[test]
    fn steady_counter_yields_delta_over_time() {
        let mut rc = calc();
        rc.compute("eth0", "rx", 0.0, 1_000_000);
        let point = rc.compute("eth0", "rx", 1.0, 1_125_000).unwrap();
        assert!((point.value - 125_000.0).abs() < 1e-9);
        assert!((point.at_secs - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fractional_interval_scales_rate() {
        let mut rc = calc();
        rc.compute("sda", "reads", 0.0, 100);
        let point = rc.compute("sda", "reads", 0.5, 150).unwrap();
        assert!((point.value - 100.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_time_delta_is_discarded() {
        let mut rc = calc();
        rc.compute("eth0", "rx", 5.0, 1000);
        assert_eq!(rc.compute("eth0", "rx", 5.0, 2000), None);
        assert_eq!(rc.compute("eth0", "rx", 4.0, 3000), None);
        // Baseline survived the anomaly; a later sample still works.
        let point = rc.compute("eth0", "rx", 6.0, 2000).unwrap();
        assert!((point.value - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn counter_reset_rebaselines_without_emitting() {
        let mut rc = calc();
        rc.compute("eth0", "rx", 0.0, 1_125_000);
        assert_eq!(rc.compute("eth0", "rx", 1.0, 500), None);
        // Next tick computes against the new baseline.
        let point = rc.compute("eth0", "rx", 2.0, 2_500).unwrap();
        assert!((point.value - 2_000.0).abs() < 1e-9);
    }

    #[test]
    fn counter_reset_can_clamp_to_zero() {
        let mut rc = RateCalculator::new(ResetPolicy::ClampZero);
        rc.compute("eth0", "rx", 0.0, 1_125_000);
        let point = rc.compute("eth0", "rx", 1.0, 500).unwrap();
        assert_eq!(point.value, 0.0);
        let point = rc.compute("eth0", "rx", 2.0, 2_500).unwrap();
        assert!((point.value - 2_000.0).abs() < 1e-9);
    }

    #[test]
    fn counters_of_one_entity_are_independent() {
        let mut rc = calc();
        rc.compute("cpu0", "busy", 0.0, 100);
        assert_eq!(rc.compute("cpu0", "idle", 1.0, 900), None);
        let busy = rc.compute("cpu0", "busy", 1.0, 150).unwrap();
        assert!((busy.value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!(
            ResetPolicy::from_str_config("clamp"),
            ResetPolicy::ClampZero
        );
        assert_eq!(
            ResetPolicy::from_str_config("rebaseline"),
            ResetPolicy::Rebaseline
        );
        assert_eq!(
            ResetPolicy::from_str_config("bogus"),
            ResetPolicy::Rebaseline
        );
    }
}
