//! Quote catalog model
//!
//! - [`types`]: the `Quote` record, validation and the dedup key
//! - [`catalog`]: ordered, deduplicated catalog with `add` and `merge`
//! - [`index`]: category listing, filtering and random selection

pub mod catalog;
pub mod index;
pub mod types;

pub use catalog::{Catalog, MergeReport};
pub use index::{categories, filter_by_category, pick_random};
pub use types::{DedupKey, Quote};
