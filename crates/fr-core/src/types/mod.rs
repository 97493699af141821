//! Canonical types shared across the pipeline.

pub mod event;
pub mod source;
pub mod symbol;

pub use event::{FundingEvent, MAX_RATE_PCT};
pub use source::Source;
pub use symbol::{is_major_coin, normalize_rate_pct, strip_quote_suffix, MAJOR_COINS};
