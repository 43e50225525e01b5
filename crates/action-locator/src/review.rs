//! Review and promotion of pending selector updates
//!
//! A review pass walks the drained queue with an explicit cursor. Every
//! decision is collected first; durable state is only touched once the pass
//! completes. Aborting leaves the catalog and the queue exactly as they were.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::catalog::CatalogStore;
use crate::errors::ReviewError;
use crate::queue::PendingQueue;
use crate::types::{Catalog, PendingUpdate};

/// Reviewer verdict for the update under the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
    /// Approve the current update and every one after it, ending the pass
    ApproveAllRemaining,
    /// End the session without touching the catalog or the queue
    Abort,
}

/// Position of the update being presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewCursor {
    /// Zero-based index into the pending list
    pub index: usize,
    pub total: usize,
}

/// Source of review decisions
#[async_trait]
pub trait Reviewer: Send {
    async fn decide(
        &mut self,
        cursor: ReviewCursor,
        update: &PendingUpdate,
    ) -> Result<ReviewDecision, ReviewError>;
}

/// Replays a fixed list of decisions; aborts once the list runs out
#[derive(Debug, Clone, Default)]
pub struct ScriptedReviewer {
    decisions: VecDeque<ReviewDecision>,
}

impl ScriptedReviewer {
    pub fn new(decisions: impl IntoIterator<Item = ReviewDecision>) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
        }
    }

    /// Approve everything that is pending
    pub fn approve_all() -> Self {
        Self::new([ReviewDecision::ApproveAllRemaining])
    }
}

#[async_trait]
impl Reviewer for ScriptedReviewer {
    async fn decide(
        &mut self,
        _cursor: ReviewCursor,
        _update: &PendingUpdate,
    ) -> Result<ReviewDecision, ReviewError> {
        Ok(self.decisions.pop_front().unwrap_or(ReviewDecision::Abort))
    }
}

/// Decisions collected by a completed pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub approved: Vec<PendingUpdate>,
    pub rejected: Vec<PendingUpdate>,
}

/// How a review session ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ReviewOutcome {
    /// The queue was empty; nothing was written
    NothingPending,
    /// The reviewer aborted at `index`; nothing was written
    Aborted { index: usize },
    /// Approved updates were applied and the queue was cleared
    Completed(ReviewSummary),
}

/// Result of walking the pending list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewPass {
    Finished(ReviewSummary),
    Aborted { index: usize },
}

/// Walk `pending` and split it into approved and rejected updates
pub async fn collect_decisions<R: Reviewer + ?Sized>(
    pending: &[PendingUpdate],
    reviewer: &mut R,
) -> Result<ReviewPass, ReviewError> {
    let mut summary = ReviewSummary::default();
    let total = pending.len();
    let mut index = 0;

    while index < total {
        let update = &pending[index];
        match reviewer.decide(ReviewCursor { index, total }, update).await? {
            ReviewDecision::Approve => summary.approved.push(update.clone()),
            ReviewDecision::Reject => summary.rejected.push(update.clone()),
            ReviewDecision::ApproveAllRemaining => {
                summary.approved.extend_from_slice(&pending[index..]);
                break;
            }
            ReviewDecision::Abort => return Ok(ReviewPass::Aborted { index }),
        }
        index += 1;
    }

    Ok(ReviewPass::Finished(summary))
}

/// Apply approved updates to `catalog` in order
pub fn apply_updates(catalog: &mut Catalog, approved: &[PendingUpdate]) {
    for update in approved {
        catalog.apply(update);
    }
}

/// Run one review pass over the queue
pub async fn run_review<R: Reviewer + ?Sized>(
    catalog: &dyn CatalogStore,
    queue: &dyn PendingQueue,
    reviewer: &mut R,
) -> Result<ReviewOutcome, ReviewError> {
    let pending = queue.drain().await;
    if pending.is_empty() {
        info!("no pending selector updates to review");
        return Ok(ReviewOutcome::NothingPending);
    }

    let summary = match collect_decisions(&pending, reviewer).await? {
        ReviewPass::Finished(summary) => summary,
        ReviewPass::Aborted { index } => {
            info!(index, total = pending.len(), "review aborted, nothing changed");
            return Ok(ReviewOutcome::Aborted { index });
        }
    };

    if !summary.approved.is_empty() {
        let mut current = catalog.load().await;
        apply_updates(&mut current, &summary.approved);
        catalog.save(&current).await?;
        info!(count = summary.approved.len(), "applied approved selector updates");
    }
    queue.clear().await?;
    info!(
        approved = summary.approved.len(),
        rejected = summary.rejected.len(),
        "review completed, pending queue cleared"
    );

    Ok(ReviewOutcome::Completed(summary))
}
