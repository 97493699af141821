//! Source registry — factory for stream definitions.
//!
//! Maps a [`Source`] identifier to its module's `build()` function. Adding
//! an exchange means adding a module and one match arm here; no shared
//! dispatch logic changes.

use fr_core::config::SourceEntry;
use fr_core::types::Source;

use crate::sources::{self, SourceDef};

/// Create the stream definition for a configured source.
pub fn build_source(entry: &SourceEntry) -> SourceDef {
    match entry.source {
        Source::Binance => sources::binance::build(entry),
        Source::Bybit => sources::bybit::build(entry),
        Source::Okx => sources::okx::build(entry),
        Source::Gateio => sources::gateio::build(entry),
        Source::Bitget => sources::bitget::build(entry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_source_builds() {
        for source in [Source::Binance, Source::Bybit, Source::Okx, Source::Gateio, Source::Bitget]
        {
            let entry = SourceEntry { source, url: None };
            let def = build_source(&entry);
            assert_eq!(def.source, source);
            assert_eq!(def.url, source.default_endpoint());
            assert!(!def.subscribe_msg.is_empty());
        }
    }

    #[test]
    fn endpoint_override_is_respected() {
        let entry = SourceEntry { source: Source::Okx, url: Some("ws://127.0.0.1:1234".into()) };
        assert_eq!(build_source(&entry).url, "ws://127.0.0.1:1234");
    }
}
