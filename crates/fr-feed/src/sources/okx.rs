//! OKX funding-rate source.
//!
//! Subscribes to the `funding-rate` channel for all SWAP instruments.
//! Envelope: `{"arg": ..., "data": [...]}` with `instId` (e.g.
//! `ALPHA-USDT-SWAP`) and `fundingRate` fields. OKX echoes `pong` to our
//! text ping.

use fr_core::config::SourceEntry;
use fr_core::types::Source;
use fr_core::ws::PingPayload;
use fr_core::FundingEvent;
use tracing::debug;

use super::{funding_event, SourceDef};
use crate::json_util::parse_f64_field;

const SUFFIXES: &[&str] = &["-USDT-SWAP", "-USD-SWAP"];

/// Build the OKX stream definition.
pub fn build(entry: &SourceEntry) -> SourceDef {
    SourceDef {
        source: Source::Okx,
        url: entry.endpoint(),
        subscribe_msg: serde_json::json!({
            "op": "subscribe",
            "args": [{"channel": "funding-rate", "instType": "SWAP"}]
        })
        .to_string(),
        ping: Some(PingPayload::Text("ping".into())),
        parser: Box::new(parse),
    }
}

/// Parse one OKX payload into funding events.
pub fn parse(text: &str) -> Vec<FundingEvent> {
    if text == "pong" {
        return Vec::new();
    }

    let v: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            debug!("[okx] non-JSON payload");
            return Vec::new();
        }
    };

    let Some(data) = v.get("data").and_then(|d| d.as_array()) else {
        return Vec::new();
    };

    data.iter()
        .filter_map(|item| {
            let sym = item.get("instId")?.as_str()?;
            let rate = parse_f64_field(item, "fundingRate")?;
            funding_event(Source::Okx, sym, SUFFIXES, rate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_funding_rate_channel() {
        let json = r#"{
            "arg": {"channel": "funding-rate", "instId": "ALPHA-USDT-SWAP"},
            "data": [{
                "instId": "ALPHA-USDT-SWAP",
                "fundingRate": "0.0003",
                "fundingTime": "1672515782000"
            }]
        }"#;
        let events = parse(json);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].symbol, "ALPHA");
        assert_eq!(events[0].source, Source::Okx);
        assert!((events[0].rate - 0.03).abs() < 1e-12);
    }

    #[test]
    fn pong_yields_nothing() {
        assert!(parse("pong").is_empty());
    }

    #[test]
    fn missing_data_yields_nothing() {
        assert!(parse(r#"{"event": "subscribe", "arg": {}}"#).is_empty());
    }
}
