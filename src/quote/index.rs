//! Category index derived from a catalog on demand

use super::catalog::Catalog;
use super::types::Quote;
use crate::config::CategoryMatch;
use crate::error::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;
use std::collections::HashSet;

/// Distinct categories in ascending order.
///
/// Under [`CategoryMatch::CaseInsensitive`] labels differing only by case
/// collapse into the spelling seen first in catalog order.
pub fn categories(catalog: &Catalog, mode: CategoryMatch) -> Vec<String> {
    match mode {
        CategoryMatch::Exact => catalog
            .iter()
            .map(|q| q.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        CategoryMatch::CaseInsensitive => {
            let mut seen = HashSet::new();
            let mut labels: Vec<String> = catalog
                .iter()
                .filter(|q| seen.insert(q.category.to_lowercase()))
                .map(|q| q.category.clone())
                .collect();
            labels.sort();
            labels
        }
    }
}

/// Quotes whose category matches `category` under `mode`, in catalog order
pub fn filter_by_category(catalog: &Catalog, category: &str, mode: CategoryMatch) -> Vec<Quote> {
    catalog
        .iter()
        .filter(|q| mode.matches(&q.category, category))
        .cloned()
        .collect()
}

/// Uniformly pick one quote; an empty selection is an [`Error::EmptyCategory`].
pub fn pick_random<'a, R: Rng + ?Sized>(
    quotes: &'a [Quote],
    category: &str,
    rng: &mut R,
) -> Result<&'a Quote> {
    quotes
        .choose(rng)
        .ok_or_else(|| Error::EmptyCategory(category.to_string()))
}
