//! Quote store backed by a persistent slot
//!
//! The store owns the in-memory catalog and is the only component that
//! writes the catalog slot. Every mutation is applied in memory first; the
//! slot write follows, and a failed write never rolls back the in-memory
//! state.

use super::slot::Slot;
use crate::error::Result;
use crate::quote::{Catalog, MergeReport, Quote};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Result of a store mutation
#[derive(Debug, Clone)]
pub struct Commit<T> {
    /// Operation-specific outcome
    pub outcome: T,
    /// Catalog after the mutation
    pub catalog: Catalog,
    /// Set when the slot write failed
    pub storage_error: Option<String>,
}

impl<T> Commit<T> {
    pub fn persisted(&self) -> bool {
        self.storage_error.is_none()
    }
}

/// Outcome of [`QuoteStore::add`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Added {
    /// The quote as stored (trimmed)
    pub quote: Quote,
    /// False when an equal entry already existed
    pub is_new: bool,
}

/// Catalog owner with slot persistence
pub struct QuoteStore {
    slot: Arc<dyn Slot>,
    key: String,
    catalog: Arc<RwLock<Catalog>>,
}

impl QuoteStore {
    /// Open the store, loading the catalog from `slot[key]`
    pub async fn open(slot: Arc<dyn Slot>, key: impl Into<String>) -> Self {
        let key = key.into();
        let catalog = Self::load(slot.as_ref(), &key).await;
        Self {
            slot,
            key,
            catalog: Arc::new(RwLock::new(catalog)),
        }
    }

    /// Read the catalog from the slot, falling back to [`Catalog::seed`]
    /// when the value is missing, unreadable, not a JSON array, or holds no
    /// valid quote.
    pub async fn load(slot: &dyn Slot, key: &str) -> Catalog {
        let data = match slot.read(key).await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(key, "No stored catalog, using seed quotes");
                return Catalog::seed();
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read stored catalog");
                return Catalog::seed();
            }
        };

        match parse_stored(&data) {
            Some(catalog) => {
                tracing::debug!(key, quotes = catalog.len(), "Loaded catalog");
                catalog
            }
            None => {
                tracing::warn!(key, "Stored catalog is malformed, using seed quotes");
                Catalog::seed()
            }
        }
    }

    /// Current catalog
    pub async fn snapshot(&self) -> Catalog {
        self.catalog.read().await.clone()
    }

    /// Serialize the current catalog into the slot
    pub async fn save(&self) -> Result<()> {
        let catalog = self.catalog.read().await;
        self.write_slot(&catalog).await
    }

    /// Validate and append one quote.
    ///
    /// Validation failures leave the catalog untouched. Duplicates are
    /// accepted without change and without a write.
    pub async fn add(&self, candidate: Quote) -> Result<Commit<Added>> {
        let mut catalog = self.catalog.write().await;
        let (quote, is_new) = catalog.add(candidate)?;

        let storage_error = if is_new {
            self.persist(&catalog).await
        } else {
            None
        };

        Ok(Commit {
            outcome: Added { quote, is_new },
            catalog: catalog.clone(),
            storage_error,
        })
    }

    /// Union candidates into the catalog, silently dropping invalid ones
    pub async fn merge(&self, candidates: Vec<Quote>) -> Commit<MergeReport> {
        let mut catalog = self.catalog.write().await;
        let report = catalog.merge(candidates);

        let storage_error = if report.added > 0 {
            self.persist(&catalog).await
        } else {
            None
        };

        tracing::debug!(
            added = report.added,
            duplicates = report.duplicates,
            rejected = report.rejected,
            "Merged quotes"
        );

        Commit {
            outcome: report,
            catalog: catalog.clone(),
            storage_error,
        }
    }

    /// Remove the stored catalog and revert to the seed quotes
    pub async fn clear(&self) -> Result<Catalog> {
        let mut catalog = self.catalog.write().await;
        self.slot.remove(&self.key).await?;
        *catalog = Catalog::seed();
        tracing::info!(key = %self.key, "Cleared stored catalog");
        Ok(catalog.clone())
    }

    async fn write_slot(&self, catalog: &Catalog) -> Result<()> {
        let json = serde_json::to_string(catalog)?;
        self.slot.write(&self.key, &json).await
    }

    async fn persist(&self, catalog: &Catalog) -> Option<String> {
        match self.write_slot(catalog).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to persist catalog");
                Some(e.to_string())
            }
        }
    }
}

fn parse_stored(data: &str) -> Option<Catalog> {
    let value: serde_json::Value = serde_json::from_str(data).ok()?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        _ => return None,
    };

    let catalog = Catalog::from_candidates(
        items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<Quote>(item).ok()),
    );

    if catalog.is_empty() {
        None
    } else {
        Some(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::slot::{FileSlot, MemorySlot};
    use tempfile::TempDir;

    async fn store_with(data: Option<&str>) -> (QuoteStore, MemorySlot) {
        let slot = MemorySlot::new();
        if let Some(data) = data {
            slot.write("quotes", data).await.unwrap();
        }
        let store = QuoteStore::open(Arc::new(slot.clone()), "quotes").await;
        (store, slot)
    }

    #[tokio::test]
    async fn test_missing_slot_loads_seed() {
        let (store, _) = store_with(None).await;
        assert_eq!(store.snapshot().await, Catalog::seed());
    }

    #[tokio::test]
    async fn test_malformed_slot_loads_seed() {
        for data in ["not json", r#"{"text":"a","category":"b"}"#, "[]", r#"[{"text":""}]"#] {
            let (store, _) = store_with(Some(data)).await;
            assert_eq!(store.snapshot().await, Catalog::seed(), "input: {}", data);
        }
    }

    #[tokio::test]
    async fn test_load_validates_and_dedups_entries() {
        let data = r#"[
            {"text": " A ", "category": "X"},
            {"text": "A", "category": "x"},
            {"text": "", "category": "X"},
            42,
            {"text": "B", "category": "Y"}
        ]"#;
        let (store, _) = store_with(Some(data)).await;
        let catalog = store.snapshot().await;
        assert_eq!(catalog.quotes(), &[Quote::new("A", "X"), Quote::new("B", "Y")]);
    }

    #[tokio::test]
    async fn test_add_persists() {
        let (store, slot) = store_with(None).await;
        let commit = store.add(Quote::new("C", "X")).await.unwrap();
        assert!(commit.outcome.is_new);
        assert!(commit.persisted());
        assert_eq!(commit.catalog.len(), 3);

        let stored = slot.read("quotes").await.unwrap().unwrap();
        let reloaded = parse_stored(&stored).unwrap();
        assert_eq!(reloaded, commit.catalog);
    }

    #[tokio::test]
    async fn test_add_invalid_is_rejected() {
        let (store, slot) = store_with(None).await;
        let err = store.add(Quote::new("", "Z")).await.unwrap_err();
        assert!(matches!(err, Error::Validation { field: "text" }));
        assert_eq!(store.snapshot().await, Catalog::seed());
        assert!(slot.read("quotes").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_memory_authoritative() {
        let slot = MemorySlot::new().with_quota(Some(10));
        let store = QuoteStore::open(Arc::new(slot), "quotes").await;

        let commit = store.add(Quote::new("Fits in memory", "Big")).await.unwrap();
        assert!(!commit.persisted());
        assert!(commit.storage_error.unwrap().contains("quota"));
        assert_eq!(store.snapshot().await.len(), 3);
        assert!(matches!(store.save().await, Err(Error::Storage(_))));
    }

    #[tokio::test]
    async fn test_merge_import_case_variant_is_duplicate() {
        let (store, _) =
            store_with(Some(r#"[{"text":"A","category":"X"},{"text":"B","category":"Y"}]"#))
                .await;
        let commit = store.merge(vec![Quote::new("A", "x")]).await;
        assert_eq!(commit.outcome.duplicates, 1);
        assert_eq!(commit.catalog.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_reverts_to_seed() {
        let dir = TempDir::new().unwrap();
        let slot = Arc::new(FileSlot::new(dir.path().to_path_buf()).await.unwrap());
        {
            let store = QuoteStore::open(slot.clone(), "quotes").await;
            store.add(Quote::new("Keep going.", "Grit")).await.unwrap();
        }

        let store = QuoteStore::open(slot.clone(), "quotes").await;
        assert_eq!(store.snapshot().await.len(), 3);

        let cleared = store.clear().await.unwrap();
        assert_eq!(cleared, Catalog::seed());
        let reopened = QuoteStore::open(slot, "quotes").await;
        assert_eq!(reopened.snapshot().await, Catalog::seed());
    }
}
