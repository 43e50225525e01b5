//! Pending-update queue
//!
//! Logically a set keyed by catalog key: at most one suggestion per key. A new
//! candidate only replaces the pending one when it scores strictly higher, so
//! a tie keeps the older reason and timestamp.
//!
//! Enqueue is a read-modify-write of the whole document without locking.
//! Parallel writers race and the last full document wins.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::document::{read_document, write_document, DocumentRead};
use crate::errors::StoreError;
use crate::types::{EnqueueOutcome, PendingUpdate};

/// Durable queue of suggestions awaiting review
#[async_trait]
pub trait PendingQueue: Send + Sync {
    /// Offer a candidate, applying the replace-if-better rule
    async fn enqueue(&self, update: PendingUpdate) -> Result<EnqueueOutcome, StoreError>;

    /// Every pending update, in queue order; empty when missing or malformed
    async fn drain(&self) -> Vec<PendingUpdate>;

    /// Reset to an empty sequence
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Merge `update` into `pending`, keeping one entry per key
pub fn merge_pending(pending: &mut Vec<PendingUpdate>, update: PendingUpdate) -> EnqueueOutcome {
    match pending.iter_mut().find(|existing| existing.key == update.key) {
        Some(existing) if update.score > existing.score => {
            let previous_score = existing.score;
            *existing = update;
            EnqueueOutcome::Replaced { previous_score }
        }
        Some(existing) => EnqueueOutcome::Discarded {
            existing_score: existing.score,
        },
        None => {
            pending.push(update);
            EnqueueOutcome::Inserted
        }
    }
}

/// Queue persisted as a pretty-printed JSON list
#[derive(Debug, Clone)]
pub struct JsonFilePendingQueue {
    path: PathBuf,
}

impl JsonFilePendingQueue {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Vec<PendingUpdate> {
        match read_document::<Vec<PendingUpdate>>(&self.path).await {
            DocumentRead::Loaded(pending) => pending,
            DocumentRead::Missing => Vec::new(),
            DocumentRead::Malformed(reason) => {
                warn!(path = %self.path.display(), %reason, "pending queue unreadable, treating as empty");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl PendingQueue for JsonFilePendingQueue {
    async fn enqueue(&self, update: PendingUpdate) -> Result<EnqueueOutcome, StoreError> {
        let mut pending = self.read().await;
        let key = update.key.clone();
        let score = update.score;
        let outcome = merge_pending(&mut pending, update);
        match outcome {
            EnqueueOutcome::Discarded { existing_score } => {
                debug!(%key, score, existing_score, "kept better pending update");
            }
            _ => {
                write_document(&self.path, &pending).await?;
                info!(%key, score, ?outcome, "queued selector update for review");
            }
        }
        Ok(outcome)
    }

    async fn drain(&self) -> Vec<PendingUpdate> {
        self.read().await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        write_document(&self.path, &Vec::<PendingUpdate>::new()).await
    }
}

/// Process-local queue
#[derive(Debug, Default)]
pub struct InMemoryPendingQueue {
    pending: Mutex<Vec<PendingUpdate>>,
}

impl InMemoryPendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

#[async_trait]
impl PendingQueue for InMemoryPendingQueue {
    async fn enqueue(&self, update: PendingUpdate) -> Result<EnqueueOutcome, StoreError> {
        Ok(merge_pending(&mut self.pending.lock(), update))
    }

    async fn drain(&self) -> Vec<PendingUpdate> {
        self.pending.lock().clone()
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.pending.lock().clear();
        Ok(())
    }
}
