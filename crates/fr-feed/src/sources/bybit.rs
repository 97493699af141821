//! Bybit linear perpetuals funding-rate source.
//!
//! Subscribes to the linear tickers channel. The envelope is
//! `{"topic": ..., "data": [...]}`; on some ticker streams `data` arrives as
//! a lone object rather than an array, so both shapes are handled. Fields:
//! `symbol` and `fundingRate`.

use fr_core::config::SourceEntry;
use fr_core::types::Source;
use fr_core::ws::PingPayload;
use fr_core::FundingEvent;
use tracing::debug;

use super::{funding_event, SourceDef};
use crate::json_util::parse_f64_field;

const SUFFIXES: &[&str] = &["USDT", "USD"];

/// Build the Bybit stream definition.
pub fn build(entry: &SourceEntry) -> SourceDef {
    SourceDef {
        source: Source::Bybit,
        url: entry.endpoint(),
        subscribe_msg: serde_json::json!({
            "op": "subscribe",
            "args": ["tickers.linear"]
        })
        .to_string(),
        ping: Some(PingPayload::Json(serde_json::json!({"op": "ping"}))),
        parser: Box::new(parse),
    }
}

/// Parse one Bybit payload into funding events.
pub fn parse(text: &str) -> Vec<FundingEvent> {
    let v: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            debug!("[bybit] non-JSON payload");
            return Vec::new();
        }
    };

    let Some(data) = v.get("data") else {
        return Vec::new();
    };

    let items: Vec<&serde_json::Value> = if let Some(arr) = data.as_array() {
        arr.iter().collect()
    } else if data.is_object() {
        vec![data]
    } else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| {
            let sym = item.get("symbol")?.as_str()?;
            let rate = parse_f64_field(item, "fundingRate")?;
            funding_event(Source::Bybit, sym, SUFFIXES, rate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_array() {
        let json = r#"{
            "topic": "tickers.linear",
            "ts": 1672515782136,
            "data": [
                {"symbol": "ALPHAUSDT", "fundingRate": "0.0005"},
                {"symbol": "ETHUSDT", "fundingRate": "0.0001"}
            ]
        }"#;
        let events = parse(json);
        assert_eq!(events.len(), 1); // ETH denylisted
        assert_eq!(events[0].symbol, "ALPHA");
        assert!((events[0].rate - 0.05).abs() < 1e-12);
        assert!((events[0].annualized_rate - 54.75).abs() < 1e-9);
    }

    #[test]
    fn parses_lone_data_object() {
        let json = r#"{
            "topic": "tickers.ALPHAUSDT",
            "data": {"symbol": "ALPHAUSDT", "fundingRate": "-0.0002"}
        }"#;
        let events = parse(json);
        assert_eq!(events.len(), 1);
        assert!((events[0].rate - -0.02).abs() < 1e-12);
    }

    #[test]
    fn subscribe_ack_yields_nothing() {
        assert!(parse(r#"{"success": true, "op": "subscribe"}"#).is_empty());
    }
}
