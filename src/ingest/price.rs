// src/ingest/price.rs
//! Price normalization for raw marketplace values.
//!
//! Accepted shapes: JSON numbers, strings such as `"USD 25.00"`, `"$1,234.56"`
//! or `"US $9.99"`, and `{ "value": ..., "currency": ... }` objects. Anything
//! else is unknown (`None`). Callers that need the legacy sentinel use
//! [`normalize_price`], which maps unknown to `0.0`.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::Value;

fn currency_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:usd|eur|gbp|cad|aud)|(?:\b(?:us|au|c|a)\s*)?\$|[€£¥]")
            .expect("currency regex")
    })
}

/// Parse a price string. Currency markers and thousands separators are
/// stripped; the rest must be one non-negative decimal number.
pub fn parse_price_str(raw: &str) -> Option<f64> {
    let stripped = currency_re().replace_all(raw, "");
    let cleaned: String = stripped
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() || !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Parse any raw price value. `None` means absent or unparsable.
pub fn parse_price(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite() && *v >= 0.0),
        Value::String(s) => parse_price_str(s),
        Value::Object(obj) => obj.get("value").and_then(parse_price),
        _ => None,
    }
}

/// Sentinel form: unknown prices become `0.0`.
pub fn normalize_price(raw: Option<&Value>) -> f64 {
    raw.and_then(parse_price).unwrap_or(0.0)
}
