// src/ingest/types.rs
//! Canonical listing model shared by every stage after ingest.
//!
//! A `Listing` is built once per raw record by a `SourceAdapter` and only read
//! afterwards. Constructors enforce the invariants: prices are never negative,
//! quality scores stay in `[0.0, 1.0]` and a delivery window is ordered.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Origin marketplace of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Marketplace {
    /// Condition-graded marketplace ("New", "Used", ...).
    #[serde(rename = "eBay")]
    Ebay,
    /// Star-rated marketplace (0-5 stars).
    #[serde(rename = "Amazon")]
    Amazon,
}

impl Marketplace {
    pub const ALL: [Marketplace; 2] = [Marketplace::Ebay, Marketplace::Amazon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Marketplace::Ebay => "eBay",
            Marketplace::Amazon => "Amazon",
        }
    }

    /// Case-insensitive lookup by display label.
    pub fn from_label(label: &str) -> Option<Self> {
        let l = label.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(l))
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimated arrival range. Both ends are `None` when nothing could be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DeliveryWindow {
    pub earliest_date: Option<NaiveDate>,
    pub latest_date: Option<NaiveDate>,
}

impl DeliveryWindow {
    pub const UNKNOWN: DeliveryWindow = DeliveryWindow {
        earliest_date: None,
        latest_date: None,
    };

    /// Window spanning both dates, whichever order they come in.
    pub fn between(a: NaiveDate, b: NaiveDate) -> Self {
        Self {
            earliest_date: Some(a.min(b)),
            latest_date: Some(a.max(b)),
        }
    }

    /// Smallest window covering every date yielded, or `UNKNOWN` for none.
    pub fn spanning<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        dates.into_iter().fold(Self::UNKNOWN, |acc, d| match acc {
            DeliveryWindow {
                earliest_date: Some(e),
                latest_date: Some(l),
            } => Self {
                earliest_date: Some(e.min(d)),
                latest_date: Some(l.max(d)),
            },
            _ => Self::between(d, d),
        })
    }

    pub fn is_dated(&self) -> bool {
        self.earliest_date.is_some()
    }
}

/// Shipping cost recovered from the delivery text or shipping options.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum DeliveryCost {
    #[default]
    Unknown,
    Free,
    Paid(f64),
}

/// Canonical, source-tagged search result.
///
/// `price` is `None` when the raw value was absent or unparsable. Ranking and
/// serialization coerce it to `0.0` through [`Listing::ranking_price`], which
/// keeps the original "unknown sorts like free" ordering while the ambiguity
/// stays visible in the type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    source: Marketplace,
    title: String,
    #[serde(serialize_with = "serialize_ranking_price")]
    price: Option<f64>,
    quality_score: f64,
    delivery_window: DeliveryWindow,
    delivery_cost: DeliveryCost,
    url: String,
    image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_price: Option<f64>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    extra: Map<String, Value>,
}

fn serialize_ranking_price<S: Serializer>(price: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(price.unwrap_or(0.0))
}

fn non_negative(p: Option<f64>) -> Option<f64> {
    p.filter(|v| v.is_finite() && *v >= 0.0)
}

impl Listing {
    pub fn new(source: Marketplace, title: impl Into<String>) -> Self {
        Self {
            source,
            title: title.into(),
            price: None,
            quality_score: 0.0,
            delivery_window: DeliveryWindow::UNKNOWN,
            delivery_cost: DeliveryCost::Unknown,
            url: String::new(),
            image: String::new(),
            original_price: None,
            extra: Map::new(),
        }
    }

    /// Negative or non-finite prices are treated as unknown.
    pub fn with_price(mut self, price: Option<f64>) -> Self {
        self.price = non_negative(price);
        self
    }

    pub fn with_quality_score(mut self, score: f64) -> Self {
        self.quality_score = if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    pub fn with_delivery(mut self, window: DeliveryWindow, cost: DeliveryCost) -> Self {
        self.delivery_window = match (window.earliest_date, window.latest_date) {
            (Some(a), Some(b)) => DeliveryWindow::between(a, b),
            (Some(d), None) | (None, Some(d)) => DeliveryWindow::between(d, d),
            (None, None) => DeliveryWindow::UNKNOWN,
        };
        self.delivery_cost = match cost {
            DeliveryCost::Paid(c) if !(c.is_finite() && c > 0.0) => {
                if c == 0.0 {
                    DeliveryCost::Free
                } else {
                    DeliveryCost::Unknown
                }
            }
            other => other,
        };
        self
    }

    pub fn with_links(mut self, url: impl Into<String>, image: impl Into<String>) -> Self {
        self.url = url.into();
        self.image = image.into();
        self
    }

    pub fn with_original_price(mut self, price: Option<f64>) -> Self {
        self.original_price = non_negative(price);
        self
    }

    /// Opaque display field carried through untouched. `Null` values are dropped.
    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        if !value.is_null() {
            self.extra.insert(key.to_string(), value);
        }
        self
    }

    pub fn source(&self) -> Marketplace {
        self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Parsed price, `None` when unknown.
    pub fn price(&self) -> Option<f64> {
        self.price
    }

    /// Price used for ordering: unknown coerces to `0.0`.
    pub fn ranking_price(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    pub fn quality_score(&self) -> f64 {
        self.quality_score
    }

    pub fn delivery_window(&self) -> DeliveryWindow {
        self.delivery_window
    }

    pub fn delivery_cost(&self) -> DeliveryCost {
        self.delivery_cost
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn original_price(&self) -> Option<f64> {
        self.original_price
    }

    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// One narrow adapter per marketplace: raw record shape in, `Listing` out.
pub trait SourceAdapter {
    fn marketplace(&self) -> Marketplace;

    /// Payload keys that may hold the listing array, checked in order.
    fn listing_keys(&self) -> &'static [&'static str];

    /// Map one raw record. Missing fields fall back to defaults, never errors.
    fn to_listing(&self, record: &Map<String, Value>, today: NaiveDate) -> Listing;
}
