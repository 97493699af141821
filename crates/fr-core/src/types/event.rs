//! The canonical event flowing through the pipeline.

use serde::Serialize;

use crate::error::FeedError;
use crate::types::source::Source;
use crate::types::symbol;

/// Funding-rate readings with magnitude above this are rejected as corrupt
/// upstream data (expressed in percent per period).
pub const MAX_RATE_PCT: f64 = 50.0;

/// One normalized funding-rate reading.
///
/// Immutable once constructed; every new reading produces a new event. The
/// significance filter stamps `change_magnitude` by building a new copy via
/// [`FundingEvent::with_change_magnitude`], never by mutating the original.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingEvent {
    /// Uppercase base symbol, quote suffix stripped (e.g. `ALPHA`).
    pub symbol: String,
    /// Period funding rate in percent (signed).
    pub rate: f64,
    /// Annualized rate in percent: `|rate| * periods_per_day * 365` unless
    /// the source supplied it directly.
    pub annualized_rate: f64,
    /// Exchange the reading came from.
    pub source: Source,
    /// UTC epoch microseconds, stamped at parse time.
    pub observed_at_us: u64,
    /// Percent change vs. the previous accepted reading for this
    /// `(symbol, source)`; 0 when no prior reading exists.
    pub change_magnitude: f64,
}

impl FundingEvent {
    /// Construct a validated event.
    ///
    /// Enforces the canonical invariants: symbol length >= 2, symbol not on
    /// the major-coin denylist, `|rate| <= 50`. When `annualized_rate` is
    /// `None` it is derived from the source's periods-per-day constant.
    pub fn new(
        symbol: String,
        rate: f64,
        annualized_rate: Option<f64>,
        source: Source,
        observed_at_us: u64,
    ) -> Result<Self, FeedError> {
        if symbol.len() < 2 {
            return Err(FeedError::InvalidEvent(format!("symbol too short: {symbol:?}")));
        }
        if symbol::is_major_coin(&symbol) {
            return Err(FeedError::InvalidEvent(format!("denylisted symbol: {symbol}")));
        }
        if rate.abs() > MAX_RATE_PCT {
            return Err(FeedError::InvalidEvent(format!(
                "rate out of range for {symbol}: {rate}"
            )));
        }

        let annualized_rate = annualized_rate
            .unwrap_or_else(|| rate.abs() * source.periods_per_day() as f64 * 365.0);

        Ok(Self {
            symbol,
            rate,
            annualized_rate,
            source,
            observed_at_us,
            change_magnitude: 0.0,
        })
    }

    /// A copy of this event with `change_magnitude` stamped.
    pub fn with_change_magnitude(&self, change_pct: f64) -> Self {
        Self { change_magnitude: change_pct, ..self.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(symbol: &str, rate: f64) -> Result<FundingEvent, FeedError> {
        FundingEvent::new(symbol.to_string(), rate, None, Source::Bybit, 1_000_000)
    }

    #[test]
    fn apr_derivation() {
        // 0.05% per 8h period: 0.05 * 3 * 365 = 54.75% APR.
        let e = ev("ALPHA", 0.05).unwrap();
        assert!((e.annualized_rate - 54.75).abs() < 1e-9);
        assert_eq!(e.change_magnitude, 0.0);
    }

    #[test]
    fn apr_uses_magnitude_for_negative_rates() {
        let e = ev("ALPHA", -0.05).unwrap();
        assert!((e.annualized_rate - 54.75).abs() < 1e-9);
        assert_eq!(e.rate, -0.05);
    }

    #[test]
    fn supplied_apr_is_kept() {
        let e = FundingEvent::new("ALPHA".into(), 0.05, Some(60.0), Source::Okx, 0).unwrap();
        assert_eq!(e.annualized_rate, 60.0);
    }

    #[test]
    fn rejects_out_of_range_rate() {
        assert!(ev("ALPHA", 50.1).is_err());
        assert!(ev("ALPHA", -51.0).is_err());
        assert!(ev("ALPHA", 50.0).is_ok());
    }

    #[test]
    fn rejects_bad_symbols() {
        assert!(ev("A", 0.05).is_err());
        assert!(ev("", 0.05).is_err());
        assert!(ev("BTC", 0.05).is_err());
    }

    #[test]
    fn change_magnitude_stamp_does_not_mutate() {
        let e = ev("ALPHA", 0.05).unwrap();
        let stamped = e.with_change_magnitude(45.0);
        assert_eq!(e.change_magnitude, 0.0);
        assert_eq!(stamped.change_magnitude, 45.0);
        assert_eq!(stamped.rate, e.rate);
    }
}
