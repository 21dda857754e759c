// src/error.rs
use thiserror::Error;

use crate::ingest::types::Marketplace;

/// Caller-contract violations and malformed payload shapes.
///
/// Dirty field values (prices, dates, ratings) never end up here; they are
/// absorbed into sentinels during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    #[error("unknown ranking criterion `{0}` (expected price, delivery, quality or best_deal)")]
    UnknownCriterion(String),
    #[error("result size must be at least 1, got {0}")]
    InvalidTopN(usize),
    #[error("malformed {marketplace} payload: {reason}")]
    MalformedPayload {
        marketplace: Marketplace,
        reason: String,
    },
}
