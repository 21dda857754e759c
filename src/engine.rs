//! # Ranking Engine
//! Pure, synchronous logic that maps `(listings, request)` → ranked shortlist.
//! No I/O and no shared state; inputs are read, never mutated.
//!
//! Order per criterion (all sorts are stable, ties keep input order):
//! - `price`: ascending ranking price (unknown counts as 0.0);
//! - `delivery`: dated listings by earliest date, undated last;
//! - `quality`: descending quality score;
//! - `best_deal`: descending `quality - price / max_price`.
//!
//! Selection then takes the top N, seeding one listing per marketplace first
//! when `ensure_both_sources` is set (see [`crate::analyze::rerank`]).

use chrono::NaiveDate;
use metrics::counter;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::analyze::rerank::select_top_n;
use crate::analyze::scoring::{max_positive_price, value_score};
use crate::error::RankError;
use crate::ingest::normalize_sources;
use crate::ingest::types::{Listing, Marketplace};

/// Ranking criterion chosen by the caller.
///
/// Serializes as its snake_case name; deserializes through [`FromStr`], so
/// config files accept the same spellings as env overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Price,
    Delivery,
    Quality,
    BestDeal,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Price => "price",
            Criterion::Delivery => "delivery",
            Criterion::Quality => "quality",
            Criterion::BestDeal => "best_deal",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "price" => Ok(Criterion::Price),
            "delivery" => Ok(Criterion::Delivery),
            "quality" => Ok(Criterion::Quality),
            "best_deal" | "best-deal" | "value" => Ok(Criterion::BestDeal),
            _ => Err(RankError::UnknownCriterion(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Criterion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Everything one ranking call needs besides the listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankRequest {
    pub criterion: Criterion,
    pub top_n: usize,
    pub ensure_both_sources: bool,
    /// Keep only the first k listings of each marketplace before merging.
    pub per_source_limit: Option<usize>,
    /// Anchor for year inference in delivery text.
    pub reference_date: NaiveDate,
}

impl RankRequest {
    /// Fairness on, no per-source limit, reference date = today (local).
    pub fn new(criterion: Criterion, top_n: usize) -> Result<Self, RankError> {
        let req = Self {
            criterion,
            top_n,
            ensure_both_sources: true,
            per_source_limit: None,
            reference_date: chrono::Local::now().date_naive(),
        };
        req.validate()?;
        Ok(req)
    }

    /// Same as [`RankRequest::new`] with the criterion given by name.
    pub fn parse(criterion: &str, top_n: usize) -> Result<Self, RankError> {
        Self::new(criterion.parse()?, top_n)
    }

    pub fn with_ensure_both_sources(mut self, on: bool) -> Self {
        self.ensure_both_sources = on;
        self
    }

    pub fn with_per_source_limit(mut self, limit: Option<usize>) -> Self {
        self.per_source_limit = limit.filter(|k| *k > 0);
        self
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }

    pub fn validate(&self) -> Result<(), RankError> {
        if self.top_n == 0 {
            return Err(RankError::InvalidTopN(self.top_n));
        }
        Ok(())
    }
}

/// Concatenate two marketplaces' listings; origin stays on each listing.
pub fn merge(first: Vec<Listing>, second: Vec<Listing>) -> Vec<Listing> {
    let mut merged = first;
    merged.extend(second);
    merged
}

fn by_price(a: &Listing, b: &Listing) -> Ordering {
    a.ranking_price().total_cmp(&b.ranking_price())
}

fn by_delivery(a: &Listing, b: &Listing) -> Ordering {
    let key = |l: &Listing| {
        let w = l.delivery_window();
        (w.earliest_date.is_none(), w.earliest_date)
    };
    key(a).cmp(&key(b))
}

fn by_quality(a: &Listing, b: &Listing) -> Ordering {
    b.quality_score().total_cmp(&a.quality_score())
}

/// Indices of `listings` in rank order for `criterion`.
pub fn order(listings: &[Listing], criterion: Criterion) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..listings.len()).collect();
    match criterion {
        Criterion::Price => idx.sort_by(|&a, &b| by_price(&listings[a], &listings[b])),
        Criterion::Delivery => idx.sort_by(|&a, &b| by_delivery(&listings[a], &listings[b])),
        Criterion::Quality => idx.sort_by(|&a, &b| by_quality(&listings[a], &listings[b])),
        Criterion::BestDeal => {
            let max_price = max_positive_price(listings);
            let scores: Vec<f64> = listings.iter().map(|l| value_score(l, max_price)).collect();
            idx.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        }
    }
    idx
}

/// Rank and select; returns indices into `listings` in result order.
pub fn rank_indices(listings: &[Listing], req: &RankRequest) -> Result<Vec<usize>, RankError> {
    // 1) Contract check, count the request
    req.validate()?;
    counter!("engine_rank_requests_total", "criterion" => req.criterion.as_str()).increment(1);

    // 2) Order by criterion, then stratified selection
    let ranked: Vec<(usize, Marketplace)> = order(listings, req.criterion)
        .into_iter()
        .map(|i| (i, listings[i].source()))
        .collect();
    let selected = select_top_n(&ranked, req.top_n, req.ensure_both_sources);

    tracing::debug!(
        target: "engine",
        criterion = %req.criterion,
        top_n = req.top_n,
        ensure_both_sources = req.ensure_both_sources,
        candidates = listings.len(),
        selected = selected.len(),
        "ranked listings"
    );
    Ok(selected)
}

/// Ranked view over already-normalized listings.
pub fn rank_listings<'a>(
    listings: &'a [Listing],
    req: &RankRequest,
) -> Result<Vec<&'a Listing>, RankError> {
    Ok(rank_indices(listings, req)?
        .into_iter()
        .map(|i| &listings[i])
        .collect())
}

/// Rank owned listings, moving the selected ones out.
pub fn rank_owned(listings: Vec<Listing>, req: &RankRequest) -> Result<Vec<Listing>, RankError> {
    let selected = rank_indices(&listings, req)?;
    let mut slots: Vec<Option<Listing>> = listings.into_iter().map(Some).collect();
    Ok(selected
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}

/// Full pipeline from raw marketplace payloads: normalize, merge, rank, select.
pub fn rank_payloads(
    ebay: &Value,
    amazon: &Value,
    req: &RankRequest,
) -> Result<Vec<Listing>, RankError> {
    req.validate()?;
    let merged = normalize_sources(ebay, amazon, req.reference_date, req.per_source_limit)?;
    rank_owned(merged, req)
}

/// Best-deal shortlist: value-score order with marketplace seeding always on.
/// The value score is a ranking artifact and never lands on the listings.
pub fn best_deal(listings: Vec<Listing>, top_n: usize) -> Result<Vec<Listing>, RankError> {
    let req = RankRequest::new(Criterion::BestDeal, top_n)?;
    rank_owned(listings, &req)
}
