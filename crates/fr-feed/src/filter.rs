//! Significance filter — decides whether a reading is new information.
//!
//! Keeps the last accepted event per `(symbol, source)` behind a mutex; this
//! map is the only mutable state shared between the supervisor tasks and the
//! sweep task. The policy deliberately trades recall for noise reduction: a
//! burst of micro-fluctuations around a threshold will not flood consumers.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use ahash::AHashMap;
use fr_core::config::FilterSettings;
use fr_core::time_util::US_PER_SEC;
use fr_core::types::{FundingEvent, Source};

/// Last-accepted-reading filter with rate, time, and magnitude gates.
pub struct SignificanceFilter {
    min_apr: f64,
    min_interval_us: u64,
    change_threshold_pct: f64,
    last: Mutex<AHashMap<(String, Source), FundingEvent>>,
}

impl SignificanceFilter {
    pub fn new(settings: &FilterSettings) -> Self {
        Self {
            min_apr: settings.min_apr,
            min_interval_us: settings.min_interval_sec * US_PER_SEC,
            change_threshold_pct: settings.change_threshold_pct,
            last: Mutex::new(AHashMap::new()),
        }
    }

    fn guard(&self) -> MutexGuard<'_, AHashMap<(String, Source), FundingEvent>> {
        // A panic while holding the lock leaves the map intact; keep going.
        self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Decide whether `event` is worth propagating.
    ///
    /// Returns the accepted event with `change_magnitude` stamped, or `None`
    /// if rejected. Policy, evaluated strictly in order:
    ///
    /// 1. annualized rate below the operator floor → reject
    /// 2. first sighting of `(symbol, source)` → accept and record
    /// 3. less than the minimum interval since the prior acceptance → reject
    /// 4. rate change below the magnitude threshold → reject
    /// 5. otherwise accept and replace the stored prior
    pub fn accept(&self, event: FundingEvent) -> Option<FundingEvent> {
        if event.annualized_rate < self.min_apr {
            return None;
        }

        let key = (event.symbol.clone(), event.source);
        let mut map = self.guard();

        let Some(prior) = map.get(&key) else {
            map.insert(key, event.clone());
            return Some(event);
        };

        if event.observed_at_us.saturating_sub(prior.observed_at_us) < self.min_interval_us {
            return None;
        }

        let change_pct = if prior.rate == 0.0 {
            0.0
        } else {
            (event.rate - prior.rate).abs() / prior.rate.abs() * 100.0
        };
        if change_pct < self.change_threshold_pct {
            return None;
        }

        let accepted = event.with_change_magnitude(change_pct);
        map.insert(key, accepted.clone());
        Some(accepted)
    }

    /// Evict entries whose reading is older than `retention` as of `now_us`.
    ///
    /// Returns the number of evicted entries. An entry aged exactly
    /// `retention` is kept; eviction requires strictly older.
    pub fn evict_older_than(&self, now_us: u64, retention: Duration) -> usize {
        let retention_us = retention.as_micros() as u64;
        let mut map = self.guard();
        let before = map.len();
        map.retain(|_, ev| now_us.saturating_sub(ev.observed_at_us) <= retention_us);
        before - map.len()
    }

    /// Number of `(symbol, source)` keys currently tracked.
    pub fn tracked_symbols(&self) -> usize {
        self.guard().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: u64 = US_PER_SEC;

    fn filter() -> SignificanceFilter {
        SignificanceFilter::new(&FilterSettings::default())
    }

    fn ev(rate: f64, at_sec: u64) -> FundingEvent {
        FundingEvent::new("XYZ".into(), rate, None, Source::Bybit, at_sec * SEC).unwrap()
    }

    #[test]
    fn first_sighting_accepted_with_zero_change() {
        let f = filter();
        let accepted = f.accept(ev(0.06, 0)).unwrap();
        assert_eq!(accepted.change_magnitude, 0.0);
        assert_eq!(f.tracked_symbols(), 1);
    }

    #[test]
    fn low_apr_floor_rejects_before_anything_else() {
        let f = filter();
        // 0.04% * 3 * 365 = 43.8% APR, below the 50% floor.
        assert!(f.accept(ev(0.04, 0)).is_none());
        assert_eq!(f.tracked_symbols(), 0);
    }

    #[test]
    fn same_reading_twice_in_window_accepted_once() {
        let f = filter();
        assert!(f.accept(ev(0.06, 0)).is_some());
        assert!(f.accept(ev(0.06, 5)).is_none());
    }

    #[test]
    fn time_gate_is_evaluated_before_magnitude() {
        let f = filter();
        assert!(f.accept(ev(0.06, 0)).is_some());
        // +122% change, but only 5s elapsed — the time gate wins.
        assert!(f.accept(ev(0.20, 5)).is_none());
    }

    #[test]
    fn small_change_after_window_rejected() {
        let f = filter();
        assert!(f.accept(ev(0.06, 0)).is_some());
        // 61s later but only ~1.7% change.
        assert!(f.accept(ev(0.061, 61)).is_none());
    }

    #[test]
    fn material_change_after_window_accepted_and_stamped() {
        let f = filter();
        assert!(f.accept(ev(0.06, 0)).is_some());
        let accepted = f.accept(ev(0.09, 61)).unwrap();
        assert!((accepted.change_magnitude - 50.0).abs() < 1e-9);
        // The stored prior is replaced: next comparison is against 0.09.
        let again = f.accept(ev(0.20, 130)).unwrap();
        assert!((again.change_magnitude - (0.11 / 0.09 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn burst_scenario_only_first_accepted() {
        // 5 readings 5 seconds apart; the time gate blocks everything after
        // the first, regardless of magnitude.
        let f = filter();
        let rates = [0.06, 0.061, 0.062, 0.09, 0.20];
        let mut accepted = 0;
        for (i, rate) in rates.iter().enumerate() {
            if f.accept(ev(*rate, i as u64 * 5)).is_some() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
    }

    #[test]
    fn sources_are_tracked_independently() {
        let f = filter();
        let a = FundingEvent::new("XYZ".into(), 0.06, None, Source::Bybit, 0).unwrap();
        let b = FundingEvent::new("XYZ".into(), 0.06, None, Source::Okx, SEC).unwrap();
        assert!(f.accept(a).is_some());
        assert!(f.accept(b).is_some());
        assert_eq!(f.tracked_symbols(), 2);
    }

    #[test]
    fn eviction_is_strictly_older_than_retention() {
        let f = filter();
        assert!(f.accept(ev(0.06, 0)).is_some());
        let hour = Duration::from_secs(3600);
        // Aged exactly one hour — kept.
        assert_eq!(f.evict_older_than(3600 * SEC, hour), 0);
        assert_eq!(f.tracked_symbols(), 1);
        // One microsecond past the hour — evicted.
        assert_eq!(f.evict_older_than(3600 * SEC + 1, hour), 1);
        assert_eq!(f.tracked_symbols(), 0);
    }
}
