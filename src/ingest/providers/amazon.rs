// src/ingest/providers/amazon.rs
//! Star-rated marketplace. Records live under `products` (raw search response)
//! or `amazon_products` (field-filtered copy); both use the `product_*` names.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::{raw_field, text_field};
use crate::analyze::scoring::quality_score;
use crate::ingest::delivery::{extract_delivery_window, parse_delivery_cost};
use crate::ingest::normalize_text;
use crate::ingest::price::parse_price;
use crate::ingest::types::{Listing, Marketplace, SourceAdapter};

#[derive(Debug, Clone, Copy, Default)]
pub struct AmazonAdapter;

impl SourceAdapter for AmazonAdapter {
    fn marketplace(&self) -> Marketplace {
        Marketplace::Amazon
    }

    fn listing_keys(&self) -> &'static [&'static str] {
        &["products", "amazon_products"]
    }

    fn to_listing(&self, record: &Map<String, Value>, today: NaiveDate) -> Listing {
        let title = text_field(record, &["product_title"])
            .map(|t| normalize_text(&t))
            .unwrap_or_default();
        let rating = text_field(record, &["product_star_rating"]);
        let delivery = text_field(record, &["product_delivery_info"]);

        Listing::new(Marketplace::Amazon, title)
            .with_price(raw_field(record, &["product_price"]).and_then(parse_price))
            .with_quality_score(quality_score(Marketplace::Amazon, rating.as_deref()))
            .with_delivery(
                extract_delivery_window(delivery.as_deref(), today),
                parse_delivery_cost(delivery.as_deref()),
            )
            .with_links(
                text_field(record, &["product_url"]).unwrap_or_default(),
                text_field(record, &["product_photo"]).unwrap_or_default(),
            )
            .with_original_price(
                raw_field(record, &["product_original_price"]).and_then(parse_price),
            )
            .with_extra("star_rating", rating.map(Value::String).unwrap_or(Value::Null))
            .with_extra(
                "delivery_info",
                delivery.map(Value::String).unwrap_or(Value::Null),
            )
            .with_extra(
                "is_prime",
                record.get("is_prime").cloned().unwrap_or(Value::Null),
            )
            .with_extra(
                "num_ratings",
                record.get("product_num_ratings").cloned().unwrap_or(Value::Null),
            )
            .with_extra(
                "item_id",
                text_field(record, &["asin"])
                    .map(Value::String)
                    .unwrap_or(Value::Null),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::{DeliveryCost, DeliveryWindow};
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 28).unwrap()
    }

    #[test]
    fn full_product() {
        let rec = json!({
            "asin": "B0TEST",
            "product_title": "  Red   Ranger  Figure ",
            "product_price": "$12.99",
            "product_original_price": "$19.99",
            "product_star_rating": "4.5",
            "product_num_ratings": 812,
            "product_url": "https://amazon.example/dp/B0TEST",
            "product_photo": "https://img.example/B0TEST.jpg",
            "product_delivery_info": "FREE delivery Tue, Dec 10 on $35 of items shipped by Amazon Or fastest delivery Tomorrow, Dec 6",
            "is_prime": true
        });
        let l = AmazonAdapter.to_listing(rec.as_object().unwrap(), today());
        assert_eq!(l.source(), Marketplace::Amazon);
        assert_eq!(l.title(), "Red Ranger Figure");
        assert_eq!(l.price(), Some(12.99));
        assert_eq!(l.original_price(), Some(19.99));
        assert!((l.quality_score() - 0.9).abs() < 1e-9);
        assert_eq!(l.delivery_cost(), DeliveryCost::Free);
        assert_eq!(
            l.delivery_window(),
            DeliveryWindow::between(
                NaiveDate::from_ymd_opt(2024, 12, 6).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 10).unwrap()
            )
        );
        assert_eq!(l.extra("is_prime"), Some(&json!(true)));
        assert_eq!(l.extra("num_ratings"), Some(&json!(812)));
        assert_eq!(l.extra("item_id"), Some(&json!("B0TEST")));
    }

    #[test]
    fn numeric_price_and_rating() {
        let rec = json!({"product_price": 12.99, "product_star_rating": 4.5});
        let l = AmazonAdapter.to_listing(rec.as_object().unwrap(), today());
        assert_eq!(l.price(), Some(12.99));
        assert!((l.quality_score() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn missing_rating_and_delivery() {
        let rec = json!({"product_title": "x", "product_price": null});
        let l = AmazonAdapter.to_listing(rec.as_object().unwrap(), today());
        assert_eq!(l.price(), None);
        assert_eq!(l.quality_score(), 0.0);
        assert_eq!(l.delivery_window(), DeliveryWindow::UNKNOWN);
        assert_eq!(l.delivery_cost(), DeliveryCost::Unknown);
    }
}
