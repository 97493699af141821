//! Wall-clock time utilities.
//!
//! All timestamps in the pipeline are UTC epoch microseconds, stamped at
//! parse time. Elapsed-time comparisons (significance window, retention
//! sweep) are done on these values directly.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as **microseconds** since Unix epoch (UTC).
#[inline]
pub fn now_us() -> u64 {
    let d = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    d.as_secs() * 1_000_000 + d.subsec_micros() as u64
}

/// Current time as **milliseconds** since Unix epoch (UTC).
#[inline]
pub fn now_ms() -> u64 {
    now_us() / 1_000
}

/// Microseconds in one second — for converting config values.
pub const US_PER_SEC: u64 = 1_000_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_after_2020() {
        // 2020-01-01 in epoch microseconds.
        assert!(now_us() > 1_577_836_800_000_000);
        assert_eq!(now_ms(), now_us() / 1_000);
    }
}
