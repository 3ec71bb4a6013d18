//! Application context
//!
//! `QuoteApp` owns the quote store, the session cache and the sync adapter,
//! and sequences the user-facing operations shared by the CLI and the HTTP
//! API. Nothing else holds catalog state.

use crate::config::{CategoryMatch, QuotebookConfig};
use crate::error::{Error, Result};
use crate::quote::{self, Catalog, MergeReport, Quote};
use crate::storage::quotes::Added;
use crate::storage::{Commit, FileSlot, MemorySlot, QuoteStore, SessionCache, SessionSnapshot, Slot};
use crate::sync::{self, HttpRemote, Poller, RetryPolicy, SyncAdapter, SyncOutcome, SyncStatus};
use crate::transfer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Where the session cache lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionScope {
    /// On disk, shared by successive CLI invocations
    Persistent,
    /// In memory, for the lifetime of this process
    Process,
}

/// Top-level application handle
pub struct QuoteApp {
    category_match: CategoryMatch,
    push_on_add: bool,
    poll_interval: Duration,
    store: Arc<QuoteStore>,
    session: SessionCache,
    sync: Arc<SyncAdapter>,
    pending_pushes: Mutex<Vec<JoinHandle<()>>>,
}

impl QuoteApp {
    /// Assemble an app from already-built parts
    pub fn new(
        config: &QuotebookConfig,
        store: QuoteStore,
        session: SessionCache,
        sync: SyncAdapter,
    ) -> Self {
        Self {
            category_match: config.catalog.category_match,
            push_on_add: config.sync.push_on_add,
            poll_interval: Duration::from_secs(config.sync.interval_secs),
            store: Arc::new(store),
            session,
            sync: Arc::new(sync),
            pending_pushes: Mutex::new(Vec::new()),
        }
    }

    /// Build the app from configuration: file-backed catalog slot, session
    /// slot per `scope`, HTTP remote.
    pub async fn from_config(config: &QuotebookConfig, scope: SessionScope) -> Result<Self> {
        let data_dir = &config.storage.data_dir;
        let catalog_slot: Arc<dyn Slot> = Arc::new(
            FileSlot::new(data_dir.clone())
                .await?
                .with_quota(config.storage.quota_bytes),
        );

        let session_slot: Arc<dyn Slot> = match scope {
            SessionScope::Persistent if config.session.persist => {
                Arc::new(FileSlot::new(data_dir.join("session")).await?)
            }
            _ => Arc::new(MemorySlot::new()),
        };

        let store = QuoteStore::open(catalog_slot, config.storage.catalog_key.clone()).await;
        let remote = HttpRemote::new(&config.sync)?;
        let adapter = SyncAdapter::new(Arc::new(remote), RetryPolicy::from(&config.sync.retry));

        tracing::debug!(
            data_dir = %data_dir.display(),
            endpoint = %config.sync.endpoint,
            "Quotebook initialized"
        );

        Ok(Self::new(
            config,
            store,
            SessionCache::new(session_slot),
            adapter,
        ))
    }

    pub fn store(&self) -> &Arc<QuoteStore> {
        &self.store
    }

    pub fn category_match(&self) -> CategoryMatch {
        self.category_match
    }

    pub async fn catalog(&self) -> Catalog {
        self.store.snapshot().await
    }

    pub async fn categories(&self) -> Vec<String> {
        quote::categories(&self.catalog().await, self.category_match)
    }

    /// All quotes, or those in `category`
    pub async fn quotes_in(&self, category: Option<&str>) -> Vec<Quote> {
        let catalog = self.catalog().await;
        match category {
            Some(category) => quote::filter_by_category(&catalog, category, self.category_match),
            None => catalog.quotes().to_vec(),
        }
    }

    /// Add a quote submitted by the user and, when configured, push it to
    /// the remote in the background.
    pub async fn add_quote(&self, text: &str, category: &str) -> Result<Commit<Added>> {
        let commit = self.store.add(Quote::new(text, category)).await?;

        if commit.outcome.is_new {
            tracing::info!(category = %commit.outcome.quote.category, "Quote added");
            if self.push_on_add {
                let handle = self.sync.push_in_background(commit.outcome.quote.clone());
                let mut pending = self.pending_pushes.lock().await;
                pending.retain(|h| !h.is_finished());
                pending.push(handle);
            }
        }
        Ok(commit)
    }

    /// Wait for background pushes started by [`add_quote`](Self::add_quote)
    pub async fn flush_pushes(&self) {
        let handles: Vec<_> = self.pending_pushes.lock().await.drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::debug!(error = %e, "Push task ended abnormally");
            }
        }
    }

    /// Pick a random quote and remember it in the session.
    ///
    /// Without an explicit category, the remembered one is used if it still
    /// has quotes, otherwise the first category in sorted order.
    pub async fn random_quote(&self, category: Option<&str>) -> Result<Quote> {
        self.random_quote_with(category, &mut StdRng::from_entropy())
            .await
    }

    pub async fn random_quote_with<R: Rng + Send>(
        &self,
        category: Option<&str>,
        rng: &mut R,
    ) -> Result<Quote> {
        let category = self.resolve_category(category).await?;
        let pool = self.quotes_in(Some(&category)).await;
        let picked = quote::pick_random(&pool, &category, rng)?.clone();

        self.session.remember_category(&category).await;
        self.session.remember_quote(&picked.text).await;
        Ok(picked)
    }

    async fn resolve_category(&self, requested: Option<&str>) -> Result<String> {
        if let Some(category) = requested.map(str::trim).filter(|c| !c.is_empty()) {
            return Ok(category.to_string());
        }

        let categories = self.categories().await;
        if let Some(remembered) = self.session.restore().await.category {
            if categories
                .iter()
                .any(|c| self.category_match.matches(c, &remembered))
            {
                return Ok(remembered);
            }
        }

        categories
            .into_iter()
            .next()
            .ok_or_else(|| Error::EmptyCategory(String::new()))
    }

    pub async fn session(&self) -> SessionSnapshot {
        self.session.restore().await
    }

    pub async fn clear_session(&self) {
        self.session.clear().await;
    }

    pub async fn export(&self) -> Result<Vec<u8>> {
        transfer::export_catalog(&self.catalog().await)
    }

    pub async fn export_to(&self, path: &Path) -> Result<()> {
        transfer::write_export_file(path, &self.catalog().await).await
    }

    /// Import an uploaded payload; `file_name` must end in `.json`
    pub async fn import_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<Commit<MergeReport>> {
        transfer::check_extension(Path::new(file_name))?;
        let candidates = transfer::import_catalog(bytes)?;
        Ok(self.merge_imported(candidates).await)
    }

    pub async fn import_file(&self, path: &Path) -> Result<Commit<MergeReport>> {
        let candidates = transfer::read_import_file(path).await?;
        Ok(self.merge_imported(candidates).await)
    }

    async fn merge_imported(&self, candidates: Vec<Quote>) -> Commit<MergeReport> {
        let commit = self.store.merge(candidates).await;
        tracing::info!(
            added = commit.outcome.added,
            duplicates = commit.outcome.duplicates,
            rejected = commit.outcome.rejected,
            "Quotes imported"
        );
        commit
    }

    /// Manual sync; optionally pushes every local quote first
    pub async fn sync_now(&self, push_all: bool) -> SyncOutcome {
        if push_all {
            let catalog = self.catalog().await;
            let pushed = self.sync.push_all(&catalog).await;
            tracing::info!(pushed, total = catalog.len(), "Pushed local quotes");
        }
        self.sync.sync(&self.store).await
    }

    pub async fn sync_status(&self) -> SyncStatus {
        self.sync.status().await
    }

    /// Start the periodic poller
    pub fn start_poller(&self) -> Poller {
        sync::spawn_poller(self.sync.clone(), self.store.clone(), self.poll_interval)
    }

    /// Forget the stored catalog and the session
    pub async fn reset(&self) -> Result<Catalog> {
        let catalog = self.store.clear().await?;
        self.session.clear().await;
        Ok(catalog)
    }
}
