// src/pipeline/breakdown.rs

//! Top-N counts of working stations by country or genre.

use std::collections::HashMap;

use crate::models::{ValidationResult, clean_country, clean_genre};

/// Field a breakdown groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownKey {
    /// Cleaned country name
    Country,
    /// First genre tag
    Genre,
}

impl BreakdownKey {
    fn extract(self, result: &ValidationResult) -> String {
        match self {
            Self::Country => clean_country(&result.candidate.country),
            Self::Genre => {
                let genre = clean_genre(&result.candidate.genre);
                genre
                    .split(',')
                    .next()
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .unwrap_or("Variety")
                    .to_string()
            }
        }
    }
}

/// Count results per key and keep the `limit` largest groups.
///
/// Sorted by count descending, ties by name ascending.
pub fn breakdown(
    results: &[ValidationResult],
    key: BreakdownKey,
    limit: usize,
) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for result in results {
        *counts.entry(key.extract(result)).or_default() += 1;
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}
