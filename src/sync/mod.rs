//! Remote sync adapter
//!
//! Pulls the remote collection and unions it into the quote store, pushes
//! newly added quotes outward, and runs a fixed-period poller.
//!
//! Conflict policy: remote quotes are appended after local ones and the
//! store's dedup keeps the local entry on a key collision. Nothing local is
//! ever overwritten by a pull.
//!
//! At most one sync runs at a time. A sync requested while another is in
//! flight (timer tick racing a manual sync) is dropped and reported as
//! [`SyncOutcome::Skipped`].

mod remote;
mod retry;

pub use remote::{HttpRemote, RemoteSource};
pub use retry::{BackoffPolicy, RetryPolicy};

use crate::error::Result;
use crate::quote::{Catalog, MergeReport, Quote};
use crate::storage::QuoteStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Result of one sync attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SyncOutcome {
    /// Remote quotes were pulled and merged
    #[serde(rename_all = "camelCase")]
    Merged {
        pulled: usize,
        report: MergeReport,
        storage_error: Option<String>,
    },
    /// Another sync was already running
    Skipped,
    /// The pull failed; the catalog is unchanged
    Failed { error: String },
}

/// Sync adapter state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    Idle,
    Syncing,
}

/// Snapshot of the adapter for status displays
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub state: SyncState,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Default)]
struct History {
    last_synced_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// Clears the in-flight flag when dropped
struct SyncGuard<'a>(&'a AtomicBool);

impl<'a> SyncGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Pull/push adapter between the quote store and a remote source
pub struct SyncAdapter {
    remote: Arc<dyn RemoteSource>,
    retry: RetryPolicy,
    syncing: AtomicBool,
    history: RwLock<History>,
}

impl SyncAdapter {
    pub fn new(remote: Arc<dyn RemoteSource>, retry: RetryPolicy) -> Self {
        Self {
            remote,
            retry,
            syncing: AtomicBool::new(false),
            history: RwLock::new(History::default()),
        }
    }

    pub fn state(&self) -> SyncState {
        if self.syncing.load(Ordering::Acquire) {
            SyncState::Syncing
        } else {
            SyncState::Idle
        }
    }

    pub async fn status(&self) -> SyncStatus {
        let history = self.history.read().await;
        SyncStatus {
            state: self.state(),
            last_synced_at: history.last_synced_at,
            last_error: history.last_error.clone(),
        }
    }

    /// Pull from the remote and merge into `store`.
    ///
    /// Never returns an error: failures are logged and reported in the
    /// outcome, and leave the catalog untouched.
    pub async fn sync(&self, store: &QuoteStore) -> SyncOutcome {
        let Some(_guard) = SyncGuard::acquire(&self.syncing) else {
            tracing::debug!("Sync already in flight, skipping");
            return SyncOutcome::Skipped;
        };

        match self.remote.pull().await {
            Ok(quotes) => {
                let pulled = quotes.len();
                let commit = store.merge(quotes).await;

                let mut history = self.history.write().await;
                history.last_synced_at = Some(Utc::now());
                history.last_error = commit.storage_error.clone();

                tracing::info!(
                    pulled,
                    added = commit.outcome.added,
                    total = commit.catalog.len(),
                    "Quotes updated from server"
                );
                SyncOutcome::Merged {
                    pulled,
                    report: commit.outcome,
                    storage_error: commit.storage_error,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to pull quotes from server");
                self.history.write().await.last_error = Some(e.to_string());
                SyncOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Push one quote, retrying per the policy
    pub async fn push(&self, quote: &Quote) -> Result<()> {
        let mut attempt = 1;
        loop {
            match self.remote.push(quote).await {
                Ok(()) => {
                    tracing::debug!(attempt, "Quote synced to server");
                    return Ok(());
                }
                Err(e) if attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::debug!(attempt, error = %e, ?delay, "Push failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Push in a detached task; failure is logged only
    pub fn push_in_background(self: &Arc<Self>, quote: Quote) -> JoinHandle<()> {
        let adapter = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = adapter.push(&quote).await {
                tracing::warn!(error = %e, "Failed to push quote to server");
            }
        })
    }

    /// Push every quote in order, returning how many succeeded
    pub async fn push_all(&self, catalog: &Catalog) -> usize {
        let mut pushed = 0;
        for quote in catalog {
            match self.push(quote).await {
                Ok(()) => pushed += 1,
                Err(e) => tracing::warn!(error = %e, "Failed to push quote to server"),
            }
        }
        pushed
    }
}

/// Handle to the periodic sync task
pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    /// Stop future ticks; a sync already running is abandoned
    pub fn stop(self) {
        self.handle.abort();
    }
}

/// Spawn a task calling [`SyncAdapter::sync`] every `period`.
///
/// The first sync happens one full period after spawning.
pub fn spawn_poller(adapter: Arc<SyncAdapter>, store: Arc<QuoteStore>, period: Duration) -> Poller {
    let period = period.max(Duration::from_secs(1));
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await;

        tracing::info!(period_secs = period.as_secs(), "Sync poller started");
        loop {
            ticker.tick().await;
            adapter.sync(&store).await;
        }
    });
    Poller { handle }
}
