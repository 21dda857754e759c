// src/ingest/providers/ebay.rs
//! Condition-graded marketplace.
//!
//! Two record shapes are accepted:
//! - pre-formatted `items`: `title`, `price` ("USD 25.00"), `condition`,
//!   `link`, `location`, `description`;
//! - raw search results under `itemSummaries`: `price: {value, currency}`,
//!   `itemWebUrl`, `image.imageUrl`, `itemLocation`, `shippingOptions`.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::{image_link, raw_field, text_field};
use crate::analyze::scoring::quality_score;
use crate::ingest::delivery::{extract_delivery_window, parse_delivery_cost};
use crate::ingest::normalize_text;
use crate::ingest::price::parse_price;
use crate::ingest::types::{DeliveryCost, DeliveryWindow, Listing, Marketplace, SourceAdapter};

#[derive(Debug, Clone, Copy, Default)]
pub struct EbayAdapter;

/// `YYYY-MM-DD` prefix of an ISO timestamp such as `2024-12-05T08:00:00.000Z`.
fn iso_date(v: &Value) -> Option<NaiveDate> {
    let s = v.as_str()?;
    NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok()
}

/// Window and cost from the first shipping option, if any.
fn shipping_option(record: &Map<String, Value>) -> Option<(DeliveryWindow, DeliveryCost)> {
    let first = record.get("shippingOptions")?.as_array()?.first()?.as_object()?;
    let dates = ["minEstimatedDeliveryDate", "maxEstimatedDeliveryDate"]
        .iter()
        .filter_map(|k| first.get(*k).and_then(iso_date));
    let window = DeliveryWindow::spanning(dates);
    let cost = first
        .get("shippingCost")
        .and_then(parse_price)
        .map(|c| {
            if c == 0.0 {
                DeliveryCost::Free
            } else {
                DeliveryCost::Paid(c)
            }
        })
        .unwrap_or(DeliveryCost::Unknown);
    Some((window, cost))
}

/// "City, State, Country" from either a plain string or an `itemLocation` object.
fn location(record: &Map<String, Value>) -> Option<String> {
    if let Some(s) = text_field(record, &["location"]) {
        return Some(s);
    }
    let loc = record.get("itemLocation")?.as_object()?;
    let parts: Vec<&str> = ["city", "stateOrProvince", "country"]
        .iter()
        .filter_map(|k| loc.get(*k).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

impl SourceAdapter for EbayAdapter {
    fn marketplace(&self) -> Marketplace {
        Marketplace::Ebay
    }

    fn listing_keys(&self) -> &'static [&'static str] {
        &["items", "itemSummaries"]
    }

    fn to_listing(&self, record: &Map<String, Value>, today: NaiveDate) -> Listing {
        let title = text_field(record, &["title"])
            .map(|t| normalize_text(&t))
            .unwrap_or_default();
        let condition = text_field(record, &["condition"]);

        let (window, cost) = match shipping_option(record) {
            Some(found) => found,
            None => {
                let info = text_field(record, &["delivery_info", "shipping"]);
                (
                    extract_delivery_window(info.as_deref(), today),
                    parse_delivery_cost(info.as_deref()),
                )
            }
        };

        let url = text_field(record, &["link", "url", "itemWebUrl"]).unwrap_or_default();
        let image = raw_field(record, &["image", "images", "thumbnailImages"])
            .and_then(image_link)
            .unwrap_or_default();
        let original_price = record
            .get("marketingPrice")
            .and_then(|m| m.get("originalPrice"))
            .and_then(parse_price);

        Listing::new(Marketplace::Ebay, title)
            .with_price(raw_field(record, &["price"]).and_then(parse_price))
            .with_quality_score(quality_score(Marketplace::Ebay, condition.as_deref()))
            .with_delivery(window, cost)
            .with_links(url, image)
            .with_original_price(original_price)
            .with_extra("condition", condition.map(Value::String).unwrap_or(Value::Null))
            .with_extra("location", location(record).map(Value::String).unwrap_or(Value::Null))
            .with_extra(
                "item_id",
                text_field(record, &["itemId", "item_id"])
                    .map(Value::String)
                    .unwrap_or(Value::Null),
            )
    }
}
