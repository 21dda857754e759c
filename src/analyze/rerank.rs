//! Stratified top-N selection over an already ranked sequence.
//!
//! - Pass 1 (seeding): walk the ranking once and take the first listing of each
//!   marketplace not yet represented, in encounter order, until
//!   `min(top_n, number of marketplaces)` slots are filled.
//! - Pass 2 (fill): walk the ranking again and append anything not yet picked
//!   until `top_n` is reached.
//!
//! The output keeps append order (seeds first, then fill by rank). With
//! `top_n == 1` or fairness off this degrades to a plain prefix.

use crate::ingest::types::Marketplace;

/// Pick positions from `ranked`, a rank-ordered list of `(listing index, source)`.
/// Returns listing indices in selection order.
pub fn select_top_n(
    ranked: &[(usize, Marketplace)],
    top_n: usize,
    ensure_both_sources: bool,
) -> Vec<usize> {
    if top_n <= 1 || !ensure_both_sources {
        return ranked.iter().take(top_n).map(|(i, _)| *i).collect();
    }
    stratified_top_n(ranked, top_n)
}

/// Seeding + fill as described in the module docs.
pub fn stratified_top_n(ranked: &[(usize, Marketplace)], top_n: usize) -> Vec<usize> {
    let seed_slots = top_n.min(Marketplace::ALL.len());
    let mut picked = vec![false; ranked.len()];
    let mut seen: Vec<Marketplace> = Vec::with_capacity(seed_slots);
    let mut out = Vec::with_capacity(top_n.min(ranked.len()));

    // 1) Seed: first listing of each marketplace, in rank order
    for (pos, (idx, source)) in ranked.iter().enumerate() {
        if out.len() >= seed_slots {
            break;
        }
        if !seen.contains(source) {
            seen.push(*source);
            picked[pos] = true;
            out.push(*idx);
        }
    }

    // 2) Fill: remaining slots by rank, skipping seeds
    for (pos, (idx, _)) in ranked.iter().enumerate() {
        if out.len() >= top_n {
            break;
        }
        if !picked[pos] {
            picked[pos] = true;
            out.push(*idx);
        }
    }

    out
}
