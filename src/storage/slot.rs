//! Key-value storage areas
//!
//! A slot maps string keys to string values. [`FileSlot`] keeps one JSON
//! file per key under a directory and survives restarts; [`MemorySlot`]
//! lives as long as the process. Both can enforce a per-value byte quota,
//! mirroring the write limits of browser storage.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A key-value storage area
#[async_trait]
pub trait Slot: Send + Sync {
    /// Read a value; `Ok(None)` when the key is absent
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    async fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; removing an absent key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

fn check_quota(quota: Option<usize>, key: &str, value: &str) -> Result<()> {
    match quota {
        Some(limit) if value.len() > limit => Err(Error::Storage(format!(
            "value for '{}' is {} bytes, quota is {} bytes",
            key,
            value.len(),
            limit
        ))),
        _ => Ok(()),
    }
}

/// Durable slot storing each key as `<dir>/<key>.json`
pub struct FileSlot {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileSlot {
    /// Create a slot rooted at `dir`, creating the directory if needed
    pub async fn new(dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir, quota: None })
    }

    /// Reject writes larger than `quota` bytes
    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(Error::Storage(format!("invalid slot key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl Slot for FileSlot {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        check_quota(self.quota, key, value)?;
        let path = self.path_for(key)?;
        tokio::fs::write(&path, value)
            .await
            .map_err(|e| Error::Storage(format!("{}: {}", path.display(), e)))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!("{}: {}", path.display(), e))),
        }
    }
}

/// Process-lifetime slot
#[derive(Default, Clone)]
pub struct MemorySlot {
    values: Arc<RwLock<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }
}

#[async_trait]
impl Slot for MemorySlot {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        check_quota(self.quota, key, value)?;
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}
