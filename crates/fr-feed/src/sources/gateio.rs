//! Gate.io futures funding-rate source.
//!
//! Envelope: `{"result": [...]}` with `contract` (e.g. `ALPHA_USDT`) and
//! `funding_rate` fields; rates arrive as strings.

use fr_core::config::SourceEntry;
use fr_core::types::Source;
use fr_core::ws::PingPayload;
use fr_core::FundingEvent;
use tracing::debug;

use super::{funding_event, SourceDef};
use crate::json_util::parse_f64_field;

const SUFFIXES: &[&str] = &["_USDT", "_USD"];

/// Build the Gate.io stream definition.
pub fn build(entry: &SourceEntry) -> SourceDef {
    SourceDef {
        source: Source::Gateio,
        url: entry.endpoint(),
        subscribe_msg: serde_json::json!({
            "method": "futures.funding_rate",
            "params": [],
            "id": 1
        })
        .to_string(),
        ping: Some(PingPayload::WebSocketPing),
        parser: Box::new(parse),
    }
}

/// Parse one Gate.io payload into funding events.
pub fn parse(text: &str) -> Vec<FundingEvent> {
    let v: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            debug!("[gateio] non-JSON payload");
            return Vec::new();
        }
    };

    let Some(result) = v.get("result").and_then(|r| r.as_array()) else {
        return Vec::new();
    };

    result
        .iter()
        .filter_map(|item| {
            let sym = item.get("contract")?.as_str()?;
            let rate = parse_f64_field(item, "funding_rate")?;
            funding_event(Source::Gateio, sym, SUFFIXES, rate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_result_array() {
        let json = r#"{
            "id": 1,
            "result": [
                {"contract": "ALPHA_USDT", "funding_rate": "0.0002"},
                {"contract": "SOL_USDT", "funding_rate": "0.0001"}
            ]
        }"#;
        let events = parse(json);
        assert_eq!(events.len(), 1); // SOL denylisted
        assert_eq!(events[0].symbol, "ALPHA");
        assert_eq!(events[0].source, Source::Gateio);
        assert!((events[0].rate - 0.02).abs() < 1e-12);
    }

    #[test]
    fn error_response_yields_nothing() {
        assert!(parse(r#"{"id": 1, "error": {"code": 2, "message": "bad"}}"#).is_empty());
    }
}
