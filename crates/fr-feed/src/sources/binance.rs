//! Binance futures funding-rate source.
//!
//! Subscribes to the all-market ticker stream. The envelope is a top-level
//! array of ticker objects: `s` is the instrument, `r` the funding rate as a
//! fraction. Tickers without an `r` field carry no funding information and
//! produce no events.

use fr_core::config::SourceEntry;
use fr_core::types::Source;
use fr_core::ws::PingPayload;
use fr_core::FundingEvent;
use tracing::debug;

use super::{funding_event, SourceDef};
use crate::json_util::parse_f64_field;

const SUFFIXES: &[&str] = &["USDT", "USD"];

/// Build the Binance stream definition.
pub fn build(entry: &SourceEntry) -> SourceDef {
    SourceDef {
        source: Source::Binance,
        url: entry.endpoint(),
        subscribe_msg: serde_json::json!({
            "method": "SUBSCRIBE",
            "params": ["!ticker@arr"],
            "id": 1
        })
        .to_string(),
        ping: Some(PingPayload::WebSocketPing),
        parser: Box::new(parse),
    }
}

/// Parse one Binance payload into funding events.
pub fn parse(text: &str) -> Vec<FundingEvent> {
    let v: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            debug!("[binance] non-JSON payload");
            return Vec::new();
        }
    };

    // Subscription acks and other control messages are objects — skip.
    let Some(tickers) = v.as_array() else {
        return Vec::new();
    };

    tickers
        .iter()
        .filter_map(|ticker| {
            let sym = ticker.get("s")?.as_str()?;
            let rate = parse_f64_field(ticker, "r")?;
            funding_event(Source::Binance, sym, SUFFIXES, rate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ticker_array() {
        let json = r#"[
            {"s": "ALPHAUSDT", "r": "0.0001", "c": "1.23"},
            {"s": "BTCUSDT", "r": "0.0001"},
            {"s": "OMEGAUSDT", "c": "4.56"}
        ]"#;
        let events = parse(json);
        // BTC is denylisted; OMEGA has no rate field.
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].symbol, "ALPHA");
        assert_eq!(events[0].source, Source::Binance);
        assert!((events[0].rate - 0.01).abs() < 1e-12);
    }

    #[test]
    fn ack_object_yields_nothing() {
        assert!(parse(r#"{"result": null, "id": 1}"#).is_empty());
    }

    #[test]
    fn garbage_yields_nothing() {
        assert!(parse("not json at all").is_empty());
        assert!(parse("").is_empty());
    }
}
