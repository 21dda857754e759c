// src/lib.rs
// Public library surface for the demo binary and integration tests.

pub mod analyze;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod shortlist;

// ---- Re-exports for stable public API ----
pub use crate::engine::{
    best_deal, merge, rank_listings, rank_owned, rank_payloads, Criterion, RankRequest,
};
pub use crate::error::RankError;
pub use crate::ingest::types::{DeliveryCost, DeliveryWindow, Listing, Marketplace};
pub use crate::shortlist::{build_shortlist, SearchPayloads, Shortlist};
