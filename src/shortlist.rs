// src/shortlist.rs
//! Gift shortlist: the main query's top listings followed by the best listing
//! for each alternate search term.
//!
//! Main entries are ranked with the request as given (fairness included).
//! Each similar term is ranked on its own to `similar_top_n` without fairness.
//! Ranks are 1-based and continue from the main block into the similar block.
//! Terms that yield no listings are skipped.

use serde::Serialize;
use serde_json::Value;

use crate::engine::{rank_payloads, Criterion, RankRequest};
use crate::error::RankError;
use crate::ingest::types::Listing;

/// Already-fetched payloads for one search term.
#[derive(Debug, Clone, Copy)]
pub struct SearchPayloads<'a> {
    pub term: &'a str,
    pub ebay: &'a Value,
    pub amazon: &'a Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Main,
    Similar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortlistEntry {
    pub rank: usize,
    pub kind: EntryKind,
    pub search_term: String,
    #[serde(flatten)]
    pub listing: Listing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shortlist {
    pub search_query: String,
    pub criterion: Criterion,
    pub products: Vec<ShortlistEntry>,
}

impl Shortlist {
    pub fn main_entries(&self) -> impl Iterator<Item = &ShortlistEntry> {
        self.products.iter().filter(|e| e.kind == EntryKind::Main)
    }

    pub fn similar_entries(&self) -> impl Iterator<Item = &ShortlistEntry> {
        self.products.iter().filter(|e| e.kind == EntryKind::Similar)
    }
}

pub fn build_shortlist(
    main: SearchPayloads<'_>,
    similar: &[SearchPayloads<'_>],
    req: &RankRequest,
    similar_top_n: usize,
) -> Result<Shortlist, RankError> {
    req.validate()?;
    let similar_req = RankRequest {
        top_n: similar_top_n,
        ensure_both_sources: false,
        ..req.clone()
    };
    similar_req.validate()?;

    let mut products = Vec::new();
    let mut push = |kind: EntryKind, term: &str, listing: Listing| {
        products.push(ShortlistEntry {
            rank: products.len() + 1,
            kind,
            search_term: term.to_string(),
            listing,
        });
    };

    for listing in rank_payloads(main.ebay, main.amazon, req)? {
        push(EntryKind::Main, main.term, listing);
    }
    for search in similar {
        let picked = rank_payloads(search.ebay, search.amazon, &similar_req)?;
        if picked.is_empty() {
            tracing::debug!(target: "engine", term = search.term, "no listings for similar term");
        }
        for listing in picked {
            push(EntryKind::Similar, search.term, listing);
        }
    }

    Ok(Shortlist {
        search_query: main.term.to_string(),
        criterion: req.criterion,
        products,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::Marketplace;
    use chrono::NaiveDate;
    use serde_json::json;

    fn req(n: usize) -> RankRequest {
        RankRequest::new(Criterion::Price, n)
            .unwrap()
            .with_reference_date(NaiveDate::from_ymd_opt(2024, 11, 28).unwrap())
    }

    #[test]
    fn ranks_continue_into_similar_block() {
        let e = json!({"items": [
            {"title": "e-cheap", "price": "USD 5.00"},
            {"title": "e-mid", "price": "USD 15.00"}
        ]});
        let a = json!({"products": [{"product_title": "a-high", "product_price": "$30.00"}]});
        let e2 = json!({"items": [{"title": "binder", "price": "USD 8.00"}]});
        let a2 = json!({"products": [{"product_title": "binder-a", "product_price": 7.5}]});
        let empty = json!(null);

        let main = SearchPayloads { term: "cards", ebay: &e, amazon: &a };
        let similar = [
            SearchPayloads { term: "binder", ebay: &e2, amazon: &a2 },
            SearchPayloads { term: "nothing", ebay: &empty, amazon: &empty },
        ];
        let s = build_shortlist(main, &similar, &req(3), 1).unwrap();

        let got: Vec<(usize, EntryKind, &str, &str)> = s
            .products
            .iter()
            .map(|e| (e.rank, e.kind, e.search_term.as_str(), e.listing.title()))
            .collect();
        assert_eq!(
            got,
            vec![
                (1, EntryKind::Main, "cards", "e-cheap"),
                (2, EntryKind::Main, "cards", "a-high"),
                (3, EntryKind::Main, "cards", "e-mid"),
                (4, EntryKind::Similar, "binder", "binder-a"),
            ]
        );
        assert_eq!(s.main_entries().count(), 3);
        assert_eq!(s.similar_entries().next().unwrap().listing.source(), Marketplace::Amazon);
    }

    #[test]
    fn serialized_entries_are_flat() {
        let e = json!({"items": [{"title": "x", "price": "USD 1.00", "link": "u"}]});
        let main = SearchPayloads { term: "q", ebay: &e, amazon: &Value::Null };
        let s = build_shortlist(main, &[], &req(1), 1).unwrap();
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["criterion"], "price");
        assert_eq!(v["products"][0]["rank"], 1);
        assert_eq!(v["products"][0]["kind"], "main");
        assert_eq!(v["products"][0]["title"], "x");
        assert_eq!(v["products"][0]["url"], "u");
    }

    #[test]
    fn zero_similar_top_n_is_rejected() {
        let main = SearchPayloads { term: "q", ebay: &Value::Null, amazon: &Value::Null };
        assert_eq!(
            build_shortlist(main, &[], &req(3), 0).unwrap_err(),
            RankError::InvalidTopN(0)
        );
    }
}
