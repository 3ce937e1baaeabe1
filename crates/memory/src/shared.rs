//! Synchronized accessor around [`MemoryStore`].
//!
//! The store is shared mutable state across concurrent agent runs and the
//! HTTP layer; this host is genuinely multi-threaded, so every access goes
//! through a `tokio::sync::Mutex`.  Lock hold times are short: bounded
//! appends, prunes, and snapshot clones — the durable write happens after
//! the lock is released.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::persist::MemoryFileStore;
use crate::schema::{MemoryKind, MemorySummary, TimestampedEntry};
use crate::store::MemoryStore;

#[derive(Clone)]
pub struct SharedMemory {
    store: Arc<Mutex<MemoryStore>>,
}

impl SharedMemory {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Load the persisted document and wrap it.
    pub fn load_from(files: &MemoryFileStore) -> Self {
        Self::new(MemoryStore::from_file(files.load()))
    }

    pub async fn remember(&self, kind: MemoryKind, content: impl Into<String>) {
        self.store.lock().await.remember(kind, content, Utc::now());
    }

    pub async fn recent(&self, kind: MemoryKind, limit: usize) -> Vec<TimestampedEntry> {
        self.store
            .lock()
            .await
            .recent(kind, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn snapshot_settings(&self, settings: serde_json::Value) {
        self.store.lock().await.snapshot_settings(settings);
    }

    pub async fn settings_snapshot(&self) -> Option<serde_json::Value> {
        self.store.lock().await.settings_snapshot().cloned()
    }

    /// Age-based eviction, called at the start of every run submission.
    pub async fn prune(&self) -> usize {
        self.store.lock().await.prune(Utc::now())
    }

    pub async fn summary(&self) -> MemorySummary {
        self.store.lock().await.summary(Utc::now())
    }

    /// Write dirty state to disk.  Returns `true` when a write happened.
    /// On failure the state is re-marked dirty so the next interval
    /// retries; the error never propagates to a run.
    pub async fn flush(&self, files: &MemoryFileStore) -> bool {
        let captured = self.store.lock().await.capture_if_dirty();
        let Some(file) = captured else {
            return false;
        };
        match files.save(&file).await {
            Ok(()) => {
                debug!(path = %files.path().display(), "memory flushed");
                true
            }
            Err(err) => {
                warn!(error = %err, "memory flush failed — will retry next interval");
                self.store.lock().await.mark_dirty();
                false
            }
        }
    }
}

/// Background flush loop: every `interval` write the memory document when
/// dirty.  Best-effort by design — a write lost to a crash between
/// intervals is accepted (memory is an assistive cache).
pub fn spawn_flush_task(
    memory: SharedMemory,
    files: MemoryFileStore,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so a fresh boot does
        // not rewrite the file it just read.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            memory.flush(&files).await;
        }
    })
}
