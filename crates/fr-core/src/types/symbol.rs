//! Symbol normalization and the major-coin denylist.
//!
//! Each exchange names perpetual instruments differently (`ALPHAUSDT`,
//! `ALPHA-USDT-SWAP`, `ALPHA_USDT`). The pipeline strips the quote-currency
//! suffix and uppercases before anything else looks at the symbol.

/// Large-cap tickers the monitor is not designed to alert on.
///
/// Funding on these stays near zero and the alerting product explicitly
/// excludes them, so readings are dropped at parse time.
pub const MAJOR_COINS: &[&str] = &[
    "BTC", "ETH", "USDT", "XRP", "BNB", "SOL", "USDC", "TRX", "DOGE", "ADA",
    "WBTC", "SUI", "LINK", "BCH", "LEO", "XLM", "AVAX", "TON", "WBT", "SHIB",
    "HBAR", "LTC", "XMR", "DOT", "DAI", "BGB", "UNI", "PEPE", "AAVE", "APT",
    "TAO", "OKB", "NEAR", "ICP", "CRO", "ETC", "ONDO", "MNT", "TKX", "GT",
    "KAS", "FTN", "POL", "VET", "TRUMP", "RENDER", "SEI", "ENA", "FET",
];

/// Returns `true` if `symbol` is on the major-coin denylist.
#[inline]
pub fn is_major_coin(symbol: &str) -> bool {
    MAJOR_COINS.contains(&symbol)
}

/// Strip a trailing quote/instrument suffix and uppercase.
///
/// `suffixes` are tried in order; the first match is removed. Callers pass
/// the source's own convention (e.g. `["-USDT-SWAP", "-USD-SWAP"]` for OKX).
pub fn strip_quote_suffix(raw: &str, suffixes: &[&str]) -> String {
    let upper = raw.to_uppercase();
    for suffix in suffixes {
        if let Some(base) = upper.strip_suffix(suffix) {
            return base.to_string();
        }
    }
    upper
}

/// Normalize a raw funding-rate reading to percentage scale.
///
/// Sources deliver rates as fractions (`0.0001` = 0.01%). Detection is by
/// magnitude: values with `|v| < 1` are treated as fractional and multiplied
/// by 100; values at or above 1 are assumed to already be percentages. This
/// heuristic is part of the upstream contract and must be preserved.
#[inline]
pub fn normalize_rate_pct(raw: f64) -> f64 {
    if raw.abs() < 1.0 { raw * 100.0 } else { raw }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_first_matching_suffix() {
        assert_eq!(strip_quote_suffix("ALPHA-USDT-SWAP", &["-USDT-SWAP", "-USD-SWAP"]), "ALPHA");
        assert_eq!(strip_quote_suffix("alpha_usdt", &["_USDT", "_USD"]), "ALPHA");
        assert_eq!(strip_quote_suffix("ALPHAUSD", &["USDT", "USD"]), "ALPHA");
    }

    #[test]
    fn no_suffix_is_uppercased_only() {
        assert_eq!(strip_quote_suffix("alpha", &["USDT"]), "ALPHA");
    }

    #[test]
    fn denylist_hits() {
        assert!(is_major_coin("BTC"));
        assert!(is_major_coin("TRUMP"));
        assert!(!is_major_coin("ALPHA"));
    }

    #[test]
    fn fractional_rates_are_rescaled() {
        assert!((normalize_rate_pct(0.0001) - 0.01).abs() < 1e-12);
        assert!((normalize_rate_pct(-0.0005) - -0.05).abs() < 1e-12);
        // Already percent — left alone.
        assert!((normalize_rate_pct(1.5) - 1.5).abs() < 1e-12);
        assert!((normalize_rate_pct(-2.0) - -2.0).abs() < 1e-12);
    }
}
