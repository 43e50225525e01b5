mod support;

use std::path::Path;
use std::sync::Arc;

use action_locator::{
    run_review, CatalogStore, EnqueueOutcome, FsDiagnosticSink, HealingResolver, Interaction,
    JsonFileCatalogStore, JsonFilePendingQueue, LocatorError, PendingQueue, PendingUpdate,
    ReviewCursor, ReviewDecision, ReviewError, ReviewOutcome, Reviewer, ScriptedReviewer,
    SelectorSource,
};
use async_trait::async_trait;
use chrono::Utc;
use support::FakePage;

const LOGIN_CATALOG: &str = r##"{
  "login.usernameInput": { "primary": "#user", "fallbacks": ["[name=username]"] },
  "login.submitBtn": {
    "primary": "#submit",
    "fallbacks": ["button:has-text('Login')", "//button[@type='submit']", ".btn-primary"]
  }
}"##;

struct Workspace {
    _dir: tempfile::TempDir,
    catalog: JsonFileCatalogStore,
    queue: JsonFilePendingQueue,
    snapshots: std::path::PathBuf,
}

impl Workspace {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let catalog_path = dir.path().join("catalog.json");
        tokio::fs::write(&catalog_path, LOGIN_CATALOG).await.unwrap();
        Self {
            catalog: JsonFileCatalogStore::new(&catalog_path),
            queue: JsonFilePendingQueue::new(dir.path().join("pending-updates.json")),
            snapshots: dir.path().join("snapshots"),
            _dir: dir,
        }
    }

    fn resolver(&self) -> HealingResolver {
        HealingResolver::new(Arc::new(self.catalog.clone()), Arc::new(self.queue.clone()))
            .with_diagnostics(Arc::new(FsDiagnosticSink::new(&self.snapshots)))
    }
}

async fn read_bytes(path: &Path) -> Option<Vec<u8>> {
    tokio::fs::read(path).await.ok()
}

async fn snapshot_count(dir: &Path) -> usize {
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return 0;
    };
    let mut count = 0;
    while let Some(_entry) = entries.next_entry().await.unwrap() {
        count += 1;
    }
    count
}

#[tokio::test]
async fn fallback_heals_username_input() {
    let ws = Workspace::new().await;
    let page = FakePage::new().matching("[name=username]", 1);
    let before = Utc::now();

    let resolved = ws
        .resolver()
        .resolve(&page, "login.usernameInput")
        .await
        .unwrap();

    assert_eq!(resolved.selector, "[name=username]");
    assert_eq!(resolved.handle.selector, "[name=username]");
    assert_eq!(resolved.source, SelectorSource::Fallback(0));
    assert_eq!(resolved.enqueue, Some(EnqueueOutcome::Inserted));

    let pending = ws.queue.drain().await;
    assert_eq!(pending.len(), 1);
    let update = &pending[0];
    assert_eq!(update.key, "login.usernameInput");
    assert_eq!(update.new_selector, "[name=username]");
    assert_eq!(update.score, 130);
    assert!(update.reason.contains("[name=username]"));
    assert!(update.ts >= before && update.ts <= Utc::now());
}

#[tokio::test]
async fn primary_match_does_not_touch_queue() {
    let ws = Workspace::new().await;
    let page = FakePage::new().matching("#user", 2).matching("[name=username]", 1);

    let resolved = ws
        .resolver()
        .resolve(&page, "login.usernameInput")
        .await
        .unwrap();

    assert_eq!(resolved.source, SelectorSource::Primary);
    assert!(resolved.suggestion.is_none());
    assert_eq!(page.probed(), vec!["#user".to_string()]);
    assert!(read_bytes(ws.queue.path()).await.is_none());
}

#[tokio::test]
async fn first_successful_fallback_stops_iteration() {
    let ws = Workspace::new().await;
    let page = FakePage::new()
        .matching("//button[@type='submit']", 1)
        .matching(".btn-primary", 1);

    let resolved = ws.resolver().resolve(&page, "login.submitBtn").await.unwrap();

    assert_eq!(resolved.source, SelectorSource::Fallback(1));
    assert_eq!(
        page.probed(),
        vec![
            "#submit".to_string(),
            "button:has-text('Login')".to_string(),
            "//button[@type='submit']".to_string(),
        ]
    );
    let pending = ws.queue.drain().await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].new_selector, "//button[@type='submit']");
    assert_eq!(pending[0].score, 70);
}

#[tokio::test]
async fn broken_fallback_is_skipped() {
    let ws = Workspace::new().await;
    let page = FakePage::new()
        .invalid("button:has-text('Login')")
        .matching(".btn-primary", 1);

    let resolved = ws.resolver().resolve(&page, "login.submitBtn").await.unwrap();
    assert_eq!(resolved.selector, ".btn-primary");
    assert_eq!(resolved.source, SelectorSource::Fallback(2));
}

#[tokio::test]
async fn invalid_primary_falls_through_to_fallbacks() {
    let ws = Workspace::new().await;
    let page = FakePage::new().invalid("#user").matching("[name=username]", 1);

    let resolved = ws
        .resolver()
        .resolve(&page, "login.usernameInput")
        .await
        .unwrap();
    assert!(resolved.is_healed());
}

#[tokio::test]
async fn repeated_heals_do_not_accumulate() {
    let ws = Workspace::new().await;
    let page = FakePage::new().matching("[name=username]", 1);
    let resolver = ws.resolver();

    resolver.resolve(&page, "login.usernameInput").await.unwrap();
    let first = ws.queue.drain().await;
    let second = resolver.resolve(&page, "login.usernameInput").await.unwrap();

    // equal score: the first observation is kept untouched
    assert_eq!(
        second.enqueue,
        Some(EnqueueOutcome::Discarded { existing_score: 130 })
    );
    assert_eq!(ws.queue.drain().await, first);
}

#[tokio::test]
async fn lower_scoring_heal_is_discarded() {
    let ws = Workspace::new().await;
    ws.queue
        .enqueue(PendingUpdate::from_heal(
            "login.submitBtn",
            "#submit-v2",
            120,
            Utc::now(),
        ))
        .await
        .unwrap();

    let page = FakePage::new().matching(".btn-primary", 1);
    let resolved = ws.resolver().resolve(&page, "login.submitBtn").await.unwrap();
    assert_eq!(resolved.suggestion.as_ref().map(|s| s.score), Some(110));
    assert_eq!(
        resolved.enqueue,
        Some(EnqueueOutcome::Discarded { existing_score: 120 })
    );

    let pending = ws.queue.drain().await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].new_selector, "#submit-v2");
    assert_eq!(pending[0].score, 120);
}

#[tokio::test]
async fn exhaustion_captures_snapshot_and_reports_key() {
    let ws = Workspace::new().await;
    let page = FakePage::new();

    let err = ws
        .resolver()
        .resolve(&page, "login.submitBtn")
        .await
        .unwrap_err();

    match &err {
        LocatorError::SelectorsExhausted {
            key,
            primary,
            attempted,
        } => {
            assert_eq!(key, "login.submitBtn");
            assert_eq!(primary, "#submit");
            assert_eq!(*attempted, 4);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_configuration_error());
    assert!(ws.queue.drain().await.is_empty());

    let mut entries = tokio::fs::read_dir(&ws.snapshots).await.unwrap();
    let entry = entries.next_entry().await.unwrap().unwrap();
    let name = entry.file_name().into_string().unwrap();
    assert!(name.starts_with("failure-login.submitBtn-"));
    let body = tokio::fs::read_to_string(entry.path()).await.unwrap();
    assert!(body.starts_with("<!-- Failed selector: #submit -->\n<html>"));
}

#[tokio::test]
async fn snapshot_failure_does_not_mask_exhaustion() {
    let ws = Workspace::new().await;
    let page = FakePage::new().without_markup();

    let err = ws
        .resolver()
        .resolve(&page, "login.usernameInput")
        .await
        .unwrap_err();

    assert!(matches!(err, LocatorError::SelectorsExhausted { .. }));
    assert_eq!(snapshot_count(&ws.snapshots).await, 0);
}

#[tokio::test]
async fn missing_key_is_not_exhaustion() {
    let ws = Workspace::new().await;
    let page = FakePage::new().matching("#anything", 1);

    let err = ws
        .resolver()
        .resolve(&page, "checkout.payBtn")
        .await
        .unwrap_err();

    assert!(matches!(err, LocatorError::NoCatalogEntry(ref key) if key == "checkout.payBtn"));
    assert!(page.probed().is_empty());
    assert_eq!(snapshot_count(&ws.snapshots).await, 0);
}

#[tokio::test]
async fn corrupt_catalog_degrades_to_unresolvable() {
    let ws = Workspace::new().await;
    tokio::fs::write(ws.catalog.path(), "{ oops").await.unwrap();
    let page = FakePage::new().matching("#user", 1);

    let err = ws
        .resolver()
        .resolve(&page, "login.usernameInput")
        .await
        .unwrap_err();
    assert!(err.is_configuration_error());
}

#[tokio::test]
async fn click_and_fill_interact_with_resolved_element() {
    let ws = Workspace::new().await;
    let page = FakePage::new()
        .matching("[name=username]", 1)
        .matching("#submit", 1);
    let resolver = ws.resolver();

    resolver
        .fill(&page, "login.usernameInput", "admin")
        .await
        .unwrap();
    resolver.click(&page, "login.submitBtn").await.unwrap();

    assert_eq!(
        page.interactions(),
        vec![
            (
                "[name=username]".to_string(),
                Interaction::Fill("admin".to_string())
            ),
            ("#submit".to_string(), Interaction::Click),
        ]
    );
}

#[tokio::test]
async fn click_on_unresolvable_key_fails_with_key() {
    let ws = Workspace::new().await;
    let page = FakePage::new();

    let err = ws
        .resolver()
        .click(&page, "login.submitBtn")
        .await
        .unwrap_err();

    assert!(matches!(err, LocatorError::ElementNotResolvable(ref key) if key == "login.submitBtn"));
    assert!(page.interactions().is_empty());
}

#[tokio::test]
async fn approved_heal_is_promoted_and_queue_cleared() {
    let ws = Workspace::new().await;
    let page = FakePage::new().matching("[name=username]", 1);
    ws.resolver()
        .resolve(&page, "login.usernameInput")
        .await
        .unwrap();

    let mut reviewer = ScriptedReviewer::new([ReviewDecision::Approve]);
    let outcome = run_review(&ws.catalog, &ws.queue, &mut reviewer)
        .await
        .unwrap();
    assert!(matches!(outcome, ReviewOutcome::Completed(ref s) if s.approved.len() == 1));

    let catalog = ws.catalog.load().await;
    let entry = catalog.get("login.usernameInput").unwrap();
    assert_eq!(entry.primary, "[name=username]");
    assert_eq!(entry.fallbacks, vec!["#user".to_string()]);
    assert!(ws.queue.drain().await.is_empty());

    // the promoted selector now resolves as primary without new suggestions
    let resolved = ws
        .resolver()
        .resolve(&page, "login.usernameInput")
        .await
        .unwrap();
    assert_eq!(resolved.source, SelectorSource::Primary);
    assert!(ws.queue.drain().await.is_empty());
}

#[tokio::test]
async fn aborted_review_leaves_documents_byte_identical() {
    let ws = Workspace::new().await;
    let page = FakePage::new()
        .matching("[name=username]", 1)
        .matching(".btn-primary", 1);
    let resolver = ws.resolver();
    resolver.resolve(&page, "login.usernameInput").await.unwrap();
    resolver.resolve(&page, "login.submitBtn").await.unwrap();

    let catalog_before = read_bytes(ws.catalog.path()).await;
    let queue_before = read_bytes(ws.queue.path()).await;

    let mut reviewer = ScriptedReviewer::new([ReviewDecision::Approve, ReviewDecision::Abort]);
    let outcome = run_review(&ws.catalog, &ws.queue, &mut reviewer)
        .await
        .unwrap();

    assert_eq!(outcome, ReviewOutcome::Aborted { index: 1 });
    assert_eq!(read_bytes(ws.catalog.path()).await, catalog_before);
    assert_eq!(read_bytes(ws.queue.path()).await, queue_before);
}

#[tokio::test]
async fn review_creates_entry_for_unknown_key() {
    let ws = Workspace::new().await;
    ws.queue
        .enqueue(PendingUpdate::from_heal(
            "products.addBtn",
            "[data-testid=add-product]",
            150,
            Utc::now(),
        ))
        .await
        .unwrap();

    let mut reviewer = ScriptedReviewer::approve_all();
    run_review(&ws.catalog, &ws.queue, &mut reviewer)
        .await
        .unwrap();

    let catalog = ws.catalog.load().await;
    let entry = catalog.get("products.addBtn").unwrap();
    assert_eq!(entry.primary, "[data-testid=add-product]");
    assert!(entry.fallbacks.is_empty());
    assert_eq!(catalog.len(), 3);
}

/// Approves the first update, then loses its input
struct FailingReviewer;

#[async_trait]
impl Reviewer for FailingReviewer {
    async fn decide(
        &mut self,
        cursor: ReviewCursor,
        _update: &PendingUpdate,
    ) -> Result<ReviewDecision, ReviewError> {
        if cursor.index == 0 {
            Ok(ReviewDecision::Approve)
        } else {
            Err(ReviewError::Reviewer("input closed".to_string()))
        }
    }
}

#[tokio::test]
async fn reviewer_error_leaves_documents_byte_identical() {
    let ws = Workspace::new().await;
    let page = FakePage::new()
        .matching("[name=username]", 1)
        .matching(".btn-primary", 1);
    let resolver = ws.resolver();
    resolver.resolve(&page, "login.usernameInput").await.unwrap();
    resolver.resolve(&page, "login.submitBtn").await.unwrap();

    let catalog_before = read_bytes(ws.catalog.path()).await;
    let queue_before = read_bytes(ws.queue.path()).await;
    assert!(queue_before.is_some());

    let err = run_review(&ws.catalog, &ws.queue, &mut FailingReviewer)
        .await
        .unwrap_err();

    assert!(matches!(err, ReviewError::Reviewer(_)));
    assert_eq!(read_bytes(ws.catalog.path()).await, catalog_before);
    assert_eq!(read_bytes(ws.queue.path()).await, queue_before);
}

#[tokio::test]
async fn unwritable_queue_still_returns_healed_element() {
    let ws = Workspace::new().await;
    let blocked = ws._dir.path().join("queue-is-a-directory");
    tokio::fs::create_dir_all(&blocked).await.unwrap();
    let resolver = HealingResolver::new(
        Arc::new(ws.catalog.clone()),
        Arc::new(JsonFilePendingQueue::new(&blocked)),
    );
    let page = FakePage::new().matching("[name=username]", 1);

    let resolved = resolver.resolve(&page, "login.usernameInput").await.unwrap();

    assert_eq!(resolved.selector, "[name=username]");
    assert_eq!(resolved.source, SelectorSource::Fallback(0));
    assert!(resolved.suggestion.is_some());
    assert!(resolved.enqueue.is_none());
    assert!(tokio::fs::metadata(&blocked).await.unwrap().is_dir());
}
