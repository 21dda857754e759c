// src/ingest/mod.rs
pub mod delivery;
pub mod price;
pub mod providers;
pub mod types;

use chrono::NaiveDate;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::error::RankError;
use crate::ingest::providers::{AmazonAdapter, EbayAdapter};
use crate::ingest::types::{Listing, SourceAdapter};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_listings_total",
            "Listings normalized from marketplace payloads."
        );
        describe_counter!(
            "ingest_price_unparsed_total",
            "Listings whose price was absent or unparsable."
        );
        describe_counter!(
            "ingest_delivery_undated_total",
            "Listings without a recoverable delivery date."
        );
    });
}

/// Normalize display text: decode HTML entities, strip tags, fold quotes and whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, "").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Locate the listing array in a payload.
///
/// `null`, a missing key or an upstream `{"error": ..}` object mean zero
/// listings. A non-object payload or a non-array listing field is malformed.
fn listing_array<'a>(
    adapter: &dyn SourceAdapter,
    payload: &'a Value,
) -> Result<&'a [Value], RankError> {
    let malformed = |reason: String| RankError::MalformedPayload {
        marketplace: adapter.marketplace(),
        reason,
    };
    let obj = match payload {
        Value::Null => return Ok(&[]),
        Value::Object(o) => o,
        other => return Err(malformed(format!("expected an object, got {}", kind(other)))),
    };
    let found = adapter
        .listing_keys()
        .iter()
        .find_map(|k| obj.get(*k).map(|v| (*k, v)));
    match found {
        None => {
            if let Some(err) = obj.get("error") {
                tracing::debug!(
                    target: "ingest",
                    source = %adapter.marketplace(),
                    error = %err,
                    "upstream payload carries an error; treating as empty"
                );
            }
            Ok(&[])
        }
        Some((_, Value::Null)) => Ok(&[]),
        Some((_, Value::Array(items))) => Ok(items.as_slice()),
        Some((key, other)) => Err(malformed(format!(
            "`{key}` must be an array, got {}",
            kind(other)
        ))),
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Normalize one marketplace payload into listings, in payload order.
/// `limit` keeps only the first `limit` records.
pub fn normalize_payload(
    adapter: &dyn SourceAdapter,
    payload: &Value,
    today: NaiveDate,
    limit: Option<usize>,
) -> Result<Vec<Listing>, RankError> {
    ensure_metrics_described();

    // 1) Locate the listing array (missing/null/error → empty)
    let records = listing_array(adapter, payload)?;
    let take = limit.unwrap_or(records.len());

    // 2) Adapt the kept prefix; every record must be an object
    let mut out = Vec::with_capacity(records.len().min(take));
    for (pos, rec) in records.iter().take(take).enumerate() {
        let Some(obj) = rec.as_object() else {
            return Err(RankError::MalformedPayload {
                marketplace: adapter.marketplace(),
                reason: format!("listing #{pos} must be an object, got {}", kind(rec)),
            });
        };
        out.push(adapter.to_listing(obj, today));
    }

    // 3) Counters + log
    let source = adapter.marketplace().as_str();
    let unparsed = out.iter().filter(|l| l.price().is_none()).count();
    let undated = out
        .iter()
        .filter(|l| !l.delivery_window().is_dated())
        .count();
    counter!("ingest_listings_total", "source" => source).increment(out.len() as u64);
    counter!("ingest_price_unparsed_total", "source" => source).increment(unparsed as u64);
    counter!("ingest_delivery_undated_total", "source" => source).increment(undated as u64);
    tracing::debug!(
        target: "ingest",
        source,
        kept = out.len(),
        available = records.len(),
        unparsed,
        undated,
        "normalized payload"
    );

    Ok(out)
}

/// Normalize both marketplaces and merge: eBay listings first, then Amazon,
/// each in payload order.
pub fn normalize_sources(
    ebay: &Value,
    amazon: &Value,
    today: NaiveDate,
    per_source_limit: Option<usize>,
) -> Result<Vec<Listing>, RankError> {
    let mut merged = normalize_payload(&EbayAdapter, ebay, today, per_source_limit)?;
    merged.extend(normalize_payload(
        &AmazonAdapter,
        amazon,
        today,
        per_source_limit,
    )?);
    Ok(merged)
}
