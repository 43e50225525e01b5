//! Healing resolver: catalog lookup, primary probe, ordered fallbacks
//!
//! The resolver only ever writes to the pending queue. Catalog changes happen
//! through the review workflow.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogStore, JsonFileCatalogStore};
use crate::config::HealConfig;
use crate::diagnostics::{DiagnosticSink, FsDiagnosticSink};
use crate::errors::{DiagnosticError, LocatorError, ProbeError};
use crate::probe::{ElementHandle, InteractOptions, Interaction, PageProbe};
use crate::queue::{JsonFilePendingQueue, PendingQueue};
use crate::scoring::score_selector;
use crate::types::{CatalogEntry, PendingUpdate, ResolvedElement, SelectorSource};

/// Catalog-driven element resolver with fallback healing
pub struct HealingResolver {
    catalog: Arc<dyn CatalogStore>,
    queue: Arc<dyn PendingQueue>,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl HealingResolver {
    /// Create a resolver without failure snapshots
    pub fn new(catalog: Arc<dyn CatalogStore>, queue: Arc<dyn PendingQueue>) -> Self {
        Self {
            catalog,
            queue,
            diagnostics: None,
        }
    }

    /// Write a snapshot through `sink` whenever a key cannot be resolved
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Wire the JSON-file stores and snapshot directory named by `config`
    pub fn from_config(config: &HealConfig) -> Self {
        let resolver = Self::new(
            Arc::new(JsonFileCatalogStore::new(&config.catalog_path)),
            Arc::new(JsonFilePendingQueue::new(&config.pending_path)),
        );
        if config.capture_diagnostics {
            resolver.with_diagnostics(Arc::new(FsDiagnosticSink::new(&config.diagnostics_dir)))
        } else {
            resolver
        }
    }

    /// Resolve `key` against the current page
    pub async fn resolve(
        &self,
        page: &dyn PageProbe,
        key: &str,
    ) -> Result<ResolvedElement, LocatorError> {
        let catalog = self.catalog.load().await;
        let entry = catalog.get(key).ok_or_else(|| {
            warn!(%key, "no catalog entry");
            LocatorError::NoCatalogEntry(key.to_string())
        })?;

        match probe(page, &entry.primary).await {
            Ok(Some(handle)) => {
                debug!(%key, selector = %entry.primary, "primary selector matched");
                return Ok(ResolvedElement {
                    key: key.to_string(),
                    selector: entry.primary.clone(),
                    source: SelectorSource::Primary,
                    handle,
                    suggestion: None,
                    enqueue: None,
                });
            }
            Ok(None) => {
                info!(%key, selector = %entry.primary, "primary selector failed, trying fallbacks");
            }
            Err(err) => {
                warn!(%key, selector = %entry.primary, error = %err, "primary probe errored, trying fallbacks");
            }
        }

        for (index, selector) in entry.fallbacks.iter().enumerate() {
            match probe(page, selector).await {
                Ok(Some(handle)) => {
                    return Ok(self.record_heal(key, selector, index, handle).await);
                }
                Ok(None) => {
                    debug!(%key, %selector, "fallback matched nothing");
                }
                Err(err) => {
                    debug!(%key, %selector, error = %err, "fallback probe errored, skipping");
                }
            }
        }

        warn!(%key, "all selectors failed");
        self.capture_failure(page, key, entry).await;
        Err(LocatorError::SelectorsExhausted {
            key: key.to_string(),
            primary: entry.primary.clone(),
            attempted: 1 + entry.fallbacks.len(),
        })
    }

    /// Resolve `key`, then perform `action` on the element
    pub async fn resolve_and_interact(
        &self,
        page: &dyn PageProbe,
        key: &str,
        action: &Interaction,
        options: &InteractOptions,
    ) -> Result<ResolvedElement, LocatorError> {
        let resolved = match self.resolve(page, key).await {
            Ok(resolved) => resolved,
            Err(err) => {
                debug!(%key, error = %err, "resolution failed before {}", action.name());
                return Err(LocatorError::ElementNotResolvable(key.to_string()));
            }
        };

        page.interact(&resolved.handle, action, options)
            .await
            .map_err(|err| LocatorError::InteractionFailed {
                key: key.to_string(),
                selector: resolved.selector.clone(),
                reason: err.to_string(),
            })?;
        Ok(resolved)
    }

    pub async fn click(
        &self,
        page: &dyn PageProbe,
        key: &str,
    ) -> Result<ResolvedElement, LocatorError> {
        self.resolve_and_interact(page, key, &Interaction::Click, &InteractOptions::default())
            .await
    }

    pub async fn fill(
        &self,
        page: &dyn PageProbe,
        key: &str,
        text: &str,
    ) -> Result<ResolvedElement, LocatorError> {
        self.resolve_and_interact(
            page,
            key,
            &Interaction::Fill(text.to_string()),
            &InteractOptions::default(),
        )
        .await
    }

    async fn record_heal(
        &self,
        key: &str,
        selector: &str,
        index: usize,
        handle: ElementHandle,
    ) -> ResolvedElement {
        let score = score_selector(selector);
        let suggestion = PendingUpdate::from_heal(key, selector, score, Utc::now());
        info!(%key, %selector, score, fallback = index, "fallback selector succeeded");

        let enqueue = match self.queue.enqueue(suggestion.clone()).await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                warn!(%key, error = %err, "failed to queue selector update");
                None
            }
        };

        ResolvedElement {
            key: key.to_string(),
            selector: selector.to_string(),
            source: SelectorSource::Fallback(index),
            handle,
            suggestion: Some(suggestion),
            enqueue,
        }
    }

    async fn capture_failure(&self, page: &dyn PageProbe, key: &str, entry: &CatalogEntry) {
        let Some(sink) = &self.diagnostics else {
            return;
        };
        match capture_snapshot(sink.as_ref(), page, key, &entry.primary).await {
            Ok(path) => info!(%key, path = %path.display(), "failure snapshot written"),
            Err(err) => warn!(%key, error = %err, "failed to capture snapshot"),
        }
    }
}

/// Read the page markup and hand it to `sink`
async fn capture_snapshot(
    sink: &dyn DiagnosticSink,
    page: &dyn PageProbe,
    key: &str,
    failed_selector: &str,
) -> Result<PathBuf, DiagnosticError> {
    let markup = page.current_markup().await?;
    sink.capture(key, failed_selector, &markup).await
}

/// Probe one selector; `Ok(None)` when nothing matches
async fn probe(page: &dyn PageProbe, selector: &str) -> Result<Option<ElementHandle>, ProbeError> {
    if page.count(selector).await? == 0 {
        return Ok(None);
    }
    page.first(selector).await.map(Some)
}
