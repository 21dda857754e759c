// src/ingest/providers/mod.rs
//! Per-marketplace adapters plus the small field accessors they share.

pub mod amazon;
pub mod ebay;

use serde_json::{Map, Value};

pub use amazon::AmazonAdapter;
pub use ebay::EbayAdapter;

/// First key holding a non-empty string or a number, rendered as text.
pub(crate) fn text_field(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match record.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First key present and non-null.
pub(crate) fn raw_field<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|k| record.get(*k).filter(|v| !v.is_null()))
}

/// Image link from a plain string, an `{ "imageUrl": .. }` object or the first
/// element of an array of either.
pub(crate) fn image_link(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(o) => o
            .get("imageUrl")
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::Array(items) => items.first().and_then(image_link),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn text_field_skips_blank_and_takes_numbers() {
        let r = obj(json!({"a": "  ", "b": 4.5, "c": "x"}));
        assert_eq!(text_field(&r, &["a", "b"]), Some("4.5".to_string()));
        assert_eq!(text_field(&r, &["missing", "c"]), Some("x".to_string()));
        assert_eq!(text_field(&r, &["missing"]), None);
    }

    #[test]
    fn image_link_shapes() {
        assert_eq!(image_link(&json!("http://i/1.jpg")), Some("http://i/1.jpg".into()));
        assert_eq!(
            image_link(&json!({"imageUrl": "http://i/2.jpg"})),
            Some("http://i/2.jpg".into())
        );
        assert_eq!(
            image_link(&json!([{"imageUrl": "http://i/3.jpg"}])),
            Some("http://i/3.jpg".into())
        );
        assert_eq!(image_link(&json!([])), None);
    }
}
