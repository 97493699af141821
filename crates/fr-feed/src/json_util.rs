//! Shared JSON parsing helpers used by all source modules.
//!
//! Exchanges encode numeric values inconsistently — sometimes JSON strings
//! (`"0.0001"`), sometimes native numbers (`0.0001`). These helpers accept
//! either.

/// Parse a JSON value (string or number) as `f64`.
#[inline]
pub fn parse_str_f64(v: Option<&serde_json::Value>) -> Option<f64> {
    let v = v?;
    if let Some(s) = v.as_str() { s.parse().ok() } else { v.as_f64() }
}

/// Parse a named field on a JSON object as `f64` (string or number).
#[inline]
pub fn parse_f64_field(v: &serde_json::Value, key: &str) -> Option<f64> {
    parse_str_f64(v.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_string_and_number() {
        let v: serde_json::Value =
            serde_json::from_str(r#"{"a": "0.0001", "b": 0.25, "c": "junk"}"#).unwrap();
        assert_eq!(parse_f64_field(&v, "a"), Some(0.0001));
        assert_eq!(parse_f64_field(&v, "b"), Some(0.25));
        assert_eq!(parse_f64_field(&v, "c"), None);
        assert_eq!(parse_f64_field(&v, "missing"), None);
    }
}
