//! Ordered, deduplicated quote catalog
//!
//! The catalog never holds two entries with the same [`DedupKey`]. When
//! entries collide, the one that came first in iteration order is kept.

use super::types::{DedupKey, Quote};
use crate::error::Result;
use serde::Serialize;
use std::collections::HashSet;

/// Ordered collection of quotes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    quotes: Vec<Quote>,
}

/// Outcome of a [`Catalog::merge`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    /// Candidates appended to the catalog
    pub added: usize,
    /// Candidates dropped because a field was empty
    pub rejected: usize,
    /// Valid candidates dropped as duplicates
    pub duplicates: usize,
}

impl Catalog {
    /// Build a catalog from untrusted candidates, dropping invalid and
    /// duplicate entries.
    pub fn from_candidates(candidates: impl IntoIterator<Item = Quote>) -> Self {
        let mut catalog = Self::default();
        catalog.merge(candidates);
        catalog
    }

    /// Catalog used when nothing usable is stored
    pub fn seed() -> Self {
        Self {
            quotes: vec![
                Quote::new(
                    "The best way to predict the future is to invent it.",
                    "Motivation",
                ),
                Quote::new("Simplicity is the soul of efficiency.", "Productivity"),
            ],
        }
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Quote> {
        self.quotes.iter()
    }

    pub fn contains(&self, quote: &Quote) -> bool {
        let key = quote.dedup_key();
        self.quotes.iter().any(|q| q.dedup_key() == key)
    }

    /// Validate and append a single quote.
    ///
    /// Returns the stored (trimmed) quote and whether it was new. A
    /// duplicate is not an error; the catalog is simply left as is.
    pub fn add(&mut self, candidate: Quote) -> Result<(Quote, bool)> {
        let quote = candidate.validated()?;
        if self.contains(&quote) {
            return Ok((quote, false));
        }
        self.quotes.push(quote.clone());
        Ok((quote, true))
    }

    /// Union `candidates` into the catalog, appending after existing entries.
    ///
    /// Invalid candidates are discarded silently and counted in the report.
    pub fn merge(&mut self, candidates: impl IntoIterator<Item = Quote>) -> MergeReport {
        let mut report = MergeReport::default();
        let mut seen: HashSet<DedupKey> = self.quotes.iter().map(Quote::dedup_key).collect();

        for candidate in candidates {
            let quote = match candidate.validated() {
                Ok(q) => q,
                Err(_) => {
                    report.rejected += 1;
                    continue;
                }
            };
            if seen.insert(quote.dedup_key()) {
                self.quotes.push(quote);
                report.added += 1;
            } else {
                report.duplicates += 1;
            }
        }

        report
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Quote;
    type IntoIter = std::slice::Iter<'a, Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.quotes.iter()
    }
}
