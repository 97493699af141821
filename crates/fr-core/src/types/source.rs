//! Exchange source identifiers.

use serde::{Deserialize, Serialize};

/// Supported upstream exchange feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Binance,
    Bybit,
    Okx,
    Gateio,
    Bitget,
}

impl Source {
    /// Default WebSocket endpoint for this source. A config entry may
    /// override it (e.g. to point at a testnet or a local replay server).
    pub fn default_endpoint(self) -> &'static str {
        match self {
            Self::Binance => "wss://fstream.binance.com/ws/",
            Self::Bybit => "wss://stream.bybit.com/v5/public/linear",
            Self::Okx => "wss://ws.okx.com:8443/ws/v5/public",
            Self::Gateio => "wss://api.gateio.ws/ws/v4/",
            Self::Bitget => "wss://ws.bitget.com/mix/v1/stream",
        }
    }

    /// Funding settlement periods per day, used to annualize a period rate.
    ///
    /// All shipped sources settle every 8 hours, i.e. 3 periods per day.
    pub const fn periods_per_day(self) -> u32 {
        3
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binance => write!(f, "binance"),
            Self::Bybit => write!(f, "bybit"),
            Self::Okx => write!(f, "okx"),
            Self::Gateio => write!(f, "gateio"),
            Self::Bitget => write!(f, "bitget"),
        }
    }
}
