//! Quote record and dedup key

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A `{text, category}` pair.
///
/// Both fields default to empty on deserialization so that partially
/// formed import entries reach validation instead of failing the whole
/// payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub category: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }

    /// Trim both fields and reject the quote if either ends up empty.
    ///
    /// `text` is checked before `category`, so a quote with both fields
    /// blank reports `text`.
    pub fn validated(self) -> Result<Self> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(Error::Validation { field: "text" });
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(Error::Validation { field: "category" });
        }
        Ok(Self {
            text: text.to_string(),
            category: category.to_string(),
        })
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            text: self.text.clone(),
            category: self.category.to_lowercase(),
        }
    }
}

/// `(text, lowercase(category))`: two quotes with equal keys are the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    text: String,
    category: String,
}
