//! Per-exchange source modules.
//!
//! Each exchange provides a `build(entry) -> SourceDef` function describing
//! its stream — endpoint, subscription handshake, ping format — plus a pure
//! `parse(text) -> Vec<FundingEvent>` function. The connection supervisor is
//! exchange-agnostic and drives everything through the [`SourceDef`].
//!
//! Parsers never let an error escape: a malformed payload yields an empty
//! vec and a `debug!` log. A funding rate of exactly zero means "no rate
//! information present" in these feeds and is discarded, not treated as a
//! legitimate zero reading.

pub mod binance;
pub mod bitget;
pub mod bybit;
pub mod gateio;
pub mod okx;

use fr_core::time_util;
use fr_core::types::{symbol, FundingEvent, Source};
use fr_core::ws::PingPayload;
use tracing::debug;

/// A text message parser: `raw_payload -> Vec<FundingEvent>`.
pub type TextParser = Box<dyn Fn(&str) -> Vec<FundingEvent> + Send + Sync>;

/// Everything the supervisor needs to run one source.
pub struct SourceDef {
    /// Exchange identifier.
    pub source: Source,
    /// WebSocket endpoint.
    pub url: String,
    /// Subscription handshake sent immediately after connect. No ack is
    /// awaited — sources do not reliably ack.
    pub subscribe_msg: String,
    /// Exchange-specific keep-alive ping, if the source expects one.
    pub ping: Option<PingPayload>,
    /// Payload parser.
    pub parser: TextParser,
}

/// Build one event from the raw symbol/rate fields common to all sources.
///
/// Applies, in order: suffix stripping and uppercasing, symbol length and
/// denylist checks, the discard-zero rule, fraction-to-percent rescaling,
/// and the out-of-range rate rejection (inside [`FundingEvent::new`]).
/// Returns `None` for anything that fails — the reading is simply dropped.
pub(crate) fn funding_event(
    source: Source,
    raw_symbol: &str,
    suffixes: &[&str],
    raw_rate: f64,
) -> Option<FundingEvent> {
    if raw_rate == 0.0 {
        return None;
    }
    let sym = symbol::strip_quote_suffix(raw_symbol, suffixes);
    let rate_pct = symbol::normalize_rate_pct(raw_rate);

    match FundingEvent::new(sym, rate_pct, None, source, time_util::now_us()) {
        Ok(ev) => Some(ev),
        Err(e) => {
            debug!("[{source}] dropped reading for {raw_symbol:?}: {e}");
            None
        }
    }
}
