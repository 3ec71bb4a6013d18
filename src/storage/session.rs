//! Session cache: last viewed quote and last selected category
//!
//! Writes are best effort. A failing session slot is logged and otherwise
//! ignored, since nothing depends on it beyond restoring the display.

use super::slot::Slot;
use serde::Serialize;
use std::sync::Arc;

const LAST_QUOTE_KEY: &str = "lastViewedQuote";
const LAST_CATEGORY_KEY: &str = "lastCategory";

/// What the session remembers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub category: Option<String>,
    pub quote: Option<String>,
}

/// Session-scoped cache over a slot
#[derive(Clone)]
pub struct SessionCache {
    slot: Arc<dyn Slot>,
}

impl SessionCache {
    pub fn new(slot: Arc<dyn Slot>) -> Self {
        Self { slot }
    }

    pub async fn remember_quote(&self, text: &str) {
        self.put(LAST_QUOTE_KEY, text).await;
    }

    pub async fn remember_category(&self, category: &str) {
        self.put(LAST_CATEGORY_KEY, category).await;
    }

    /// Fetch both values; absence or read failure yields `None`
    pub async fn restore(&self) -> SessionSnapshot {
        SessionSnapshot {
            category: self.get(LAST_CATEGORY_KEY).await,
            quote: self.get(LAST_QUOTE_KEY).await,
        }
    }

    pub async fn clear(&self) {
        for key in [LAST_QUOTE_KEY, LAST_CATEGORY_KEY] {
            if let Err(e) = self.slot.remove(key).await {
                tracing::debug!(key, error = %e, "Failed to clear session value");
            }
        }
    }

    async fn put(&self, key: &str, value: &str) {
        if let Err(e) = self.slot.write(key, value).await {
            tracing::debug!(key, error = %e, "Failed to write session value");
        }
    }

    async fn get(&self, key: &str) -> Option<String> {
        match self.slot.read(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(key, error = %e, "Failed to read session value");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::slot::MemorySlot;

    #[tokio::test]
    async fn test_restore_empty() {
        let cache = SessionCache::new(Arc::new(MemorySlot::new()));
        assert_eq!(cache.restore().await, SessionSnapshot::default());
    }

    #[tokio::test]
    async fn test_remember_and_restore() {
        let cache = SessionCache::new(Arc::new(MemorySlot::new()));
        cache.remember_category("Motivation").await;
        cache.remember_quote("Stay hungry.").await;

        let snap = cache.restore().await;
        assert_eq!(snap.category.as_deref(), Some("Motivation"));
        assert_eq!(snap.quote.as_deref(), Some("Stay hungry."));
    }

    #[tokio::test]
    async fn test_clear_wipes_both() {
        let cache = SessionCache::new(Arc::new(MemorySlot::new()));
        cache.remember_category("Motivation").await;
        cache.remember_quote("Stay hungry.").await;
        cache.clear().await;
        assert_eq!(cache.restore().await, SessionSnapshot::default());
    }

    #[tokio::test]
    async fn test_write_failures_are_swallowed() {
        let cache = SessionCache::new(Arc::new(MemorySlot::new().with_quota(Some(3))));
        cache.remember_quote("far too long for the quota").await;
        cache.remember_category("Zen").await;

        let snap = cache.restore().await;
        assert!(snap.quote.is_none());
        assert_eq!(snap.category.as_deref(), Some("Zen"));
    }
}
