// src/analyze/mod.rs
//! Scoring and selection primitives used by the ranking engine.

pub mod rerank;
pub mod scoring;

// Re-export convenient items.
pub use crate::analyze::rerank::{select_top_n, stratified_top_n};
pub use crate::analyze::scoring::{
    condition_score, max_positive_price, quality_score, quality_score_for_label, rating_score,
    value_score, MAX_STAR_RATING,
};
