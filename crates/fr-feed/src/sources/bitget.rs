//! Bitget mix (futures) funding-rate source.
//!
//! Envelope: `{"arg": ..., "data": [...]}` with `instId` and `fundingRate`
//! fields. Bitget echoes `pong` to our text ping.

use fr_core::config::SourceEntry;
use fr_core::types::Source;
use fr_core::ws::PingPayload;
use fr_core::FundingEvent;
use tracing::debug;

use super::{funding_event, SourceDef};
use crate::json_util::parse_f64_field;

const SUFFIXES: &[&str] = &["USDT", "USD"];

/// Build the Bitget stream definition.
pub fn build(entry: &SourceEntry) -> SourceDef {
    SourceDef {
        source: Source::Bitget,
        url: entry.endpoint(),
        subscribe_msg: serde_json::json!({
            "op": "subscribe",
            "args": [{"instType": "mc", "channel": "funding-rate", "instId": "default"}]
        })
        .to_string(),
        ping: Some(PingPayload::Text("ping".into())),
        parser: Box::new(parse),
    }
}

/// Parse one Bitget payload into funding events.
pub fn parse(text: &str) -> Vec<FundingEvent> {
    if text == "pong" {
        return Vec::new();
    }

    let v: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            debug!("[bitget] non-JSON payload");
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
            funding_event(Source::Bitget, sym, SUFFIXES, rate)
        })
        .collect()
}
