// src/pipeline/dedupe.rs

//! Candidate deduplication by normalized endpoint.

use std::collections::HashSet;

use crate::models::Candidate;

/// Keep the first candidate seen for each endpoint, in input order.
///
/// Candidates without any URL have no identity and are kept as-is; the
/// resolver reports them as failed.
pub fn dedupe(candidates: &[Candidate]) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter(|c| match c.identity() {
            Some(id) => seen.insert(id),
            None => true,
        })
        .cloned()
        .collect()
}
