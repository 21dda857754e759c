//! Quality and value scoring.
//!
//! Both marketplaces land on the same `[0,1]` quality scale even though the raw
//! signals differ:
//! - eBay condition: contains "new" → 1.0, contains "used" → 0.5, else 0.0
//!   (case-insensitive, "new" is checked first).
//! - Amazon stars: rating / 5.0, unparsable → 0.0.
//!
//! Value score (best-deal mode) = quality - price / max_price.

use crate::ingest::types::{Listing, Marketplace};

/// Highest star rating on the rated marketplace.
pub const MAX_STAR_RATING: f64 = 5.0;

/// Three-tier condition scale.
pub fn condition_score(condition: Option<&str>) -> f64 {
    let Some(c) = condition else {
        return 0.0;
    };
    let c = c.to_lowercase();
    if c.contains("new") {
        1.0
    } else if c.contains("used") {
        0.5
    } else {
        0.0
    }
}

/// Star rating scaled into `[0,1]`.
pub fn rating_score(rating: Option<&str>) -> f64 {
    rating
        .and_then(|r| r.trim().parse::<f64>().ok())
        .filter(|r| r.is_finite())
        .map(|r| (r / MAX_STAR_RATING).clamp(0.0, 1.0))
        .unwrap_or(0.0)
}

/// Quality for a listing's raw signal on its own marketplace scale.
pub fn quality_score(source: Marketplace, signal: Option<&str>) -> f64 {
    match source {
        Marketplace::Ebay => condition_score(signal),
        Marketplace::Amazon => rating_score(signal),
    }
}

/// Same as [`quality_score`] for a free-form source label; unknown labels score 0.0.
pub fn quality_score_for_label(label: &str, signal: Option<&str>) -> f64 {
    Marketplace::from_label(label)
        .map(|m| quality_score(m, signal))
        .unwrap_or(0.0)
}

/// Largest positive ranking price, or 1.0 when there is none.
pub fn max_positive_price(listings: &[Listing]) -> f64 {
    listings
        .iter()
        .map(Listing::ranking_price)
        .filter(|p| *p > 0.0)
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))))
        .unwrap_or(1.0)
}

/// Quality minus price normalized by `max_price`.
pub fn value_score(listing: &Listing, max_price: f64) -> f64 {
    let normalized = if max_price > 0.0 {
        listing.ranking_price() / max_price
    } else {
        0.0
    };
    listing.quality_score() - normalized
}
