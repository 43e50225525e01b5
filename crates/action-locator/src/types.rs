//! Core types for the healing engine

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::probe::ElementHandle;

/// Selectors known for one logical element
///
/// `primary` is tried first; `fallbacks` are tried in order, most preferred first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub primary: String,
    #[serde(default)]
    pub fallbacks: Vec<String>,
}

impl CatalogEntry {
    pub fn new(primary: impl Into<String>, fallbacks: Vec<String>) -> Self {
        Self {
            primary: primary.into(),
            fallbacks,
        }
    }

    /// Make `selector` authoritative and demote the current primary to the
    /// front of the fallback list.
    ///
    /// The promoted selector is removed from the fallbacks and the demoted
    /// primary appears there exactly once, so `primary` never shows up in
    /// `fallbacks` afterwards.
    pub fn promote(&mut self, selector: &str) {
        if self.primary == selector {
            self.fallbacks.retain(|s| s != selector);
            return;
        }
        let demoted = std::mem::replace(&mut self.primary, selector.to_string());
        self.fallbacks.retain(|s| s != selector && *s != demoted);
        self.fallbacks.insert(0, demoted);
    }

    /// All selectors in probe order
    pub fn probe_order(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }

    /// Problems that break the entry invariants, if any
    pub fn violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.fallbacks.iter().any(|s| *s == self.primary) {
            problems.push(format!("primary {} repeated in fallbacks", self.primary));
        }
        for (idx, selector) in self.fallbacks.iter().enumerate() {
            if self.fallbacks[..idx].contains(selector) {
                problems.push(format!("duplicate fallback {}", selector));
            }
        }
        problems
    }
}

/// Mapping from logical element key to its selectors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: CatalogEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CatalogEntry)> {
        self.entries.iter()
    }

    /// Apply one approved update: create the entry when absent, otherwise
    /// promote the new selector over the current primary.
    pub fn apply(&mut self, update: &PendingUpdate) {
        match self.entries.get_mut(&update.key) {
            Some(entry) => entry.promote(&update.new_selector),
            None => {
                self.entries.insert(
                    update.key.clone(),
                    CatalogEntry::new(update.new_selector.clone(), Vec::new()),
                );
            }
        }
    }
}

impl FromIterator<(String, CatalogEntry)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, CatalogEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Proposed promotion awaiting human review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpdate {
    /// Target catalog key
    pub key: String,

    /// Selector that matched when the primary failed
    #[serde(rename = "newSel")]
    pub new_selector: String,

    /// Heuristic quality of `new_selector`
    pub score: u32,

    /// Human-readable justification
    pub reason: String,

    /// When the heal was observed
    pub ts: DateTime<Utc>,
}

impl PendingUpdate {
    /// Build the update recorded after a fallback rescued a failing primary
    pub fn from_heal(key: &str, selector: &str, score: u32, ts: DateTime<Utc>) -> Self {
        Self {
            key: key.to_string(),
            new_selector: selector.to_string(),
            score,
            reason: format!("Primary selector failed, fallback succeeded: {}", selector),
            ts,
        }
    }
}

/// Result of offering a candidate to the pending queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum EnqueueOutcome {
    /// No update was pending for the key
    Inserted,

    /// The candidate scored strictly higher than the pending update
    Replaced { previous_score: u32 },

    /// The pending update scored the same or higher; nothing was written
    Discarded { existing_score: u32 },
}

impl EnqueueOutcome {
    pub fn wrote(&self) -> bool {
        !matches!(self, EnqueueOutcome::Discarded { .. })
    }
}

/// Which catalog selector produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorSource {
    Primary,
    /// Zero-based position in the fallback list
    Fallback(usize),
}

/// Element resolution result
#[derive(Debug, Clone)]
pub struct ResolvedElement {
    /// Logical key that was requested
    pub key: String,

    /// Selector that matched
    pub selector: String,

    /// Where in the catalog entry the selector came from
    pub source: SelectorSource,

    /// Handle bound to the first matching element
    pub handle: ElementHandle,

    /// Suggestion recorded for review when a fallback was used
    pub suggestion: Option<PendingUpdate>,

    /// What the queue did with the suggestion; `None` if the write failed
    pub enqueue: Option<EnqueueOutcome>,
}

impl ResolvedElement {
    /// Check if this result came from a fallback selector
    pub fn is_healed(&self) -> bool {
        matches!(self.source, SelectorSource::Fallback(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(key: &str, selector: &str) -> PendingUpdate {
        PendingUpdate::from_heal(key, selector, 130, Utc::now())
    }

    #[test]
    fn promote_demotes_primary_to_front() {
        let mut entry = CatalogEntry::new("#user", vec!["[name=username]".to_string()]);
        entry.promote("[name=username]");

        assert_eq!(entry.primary, "[name=username]");
        assert_eq!(entry.fallbacks, vec!["#user".to_string()]);
        assert!(entry.violations().is_empty());
    }

    #[test]
    fn promote_does_not_duplicate_known_fallback() {
        let mut entry = CatalogEntry::new(
            "#user",
            vec![
                "[name=username]".to_string(),
                "#user".to_string(),
                "input.user".to_string(),
            ],
        );
        entry.promote("input.user");

        assert_eq!(entry.primary, "input.user");
        assert_eq!(
            entry.fallbacks,
            vec!["#user".to_string(), "[name=username]".to_string()]
        );
    }

    #[test]
    fn promote_same_selector_keeps_entry_stable() {
        let mut entry = CatalogEntry::new("#user", vec![".user".to_string()]);
        entry.promote("#user");

        assert_eq!(entry.primary, "#user");
        assert_eq!(entry.fallbacks, vec![".user".to_string()]);
    }

    #[test]
    fn apply_creates_missing_entry() {
        let mut catalog = Catalog::new();
        catalog.apply(&update("login.submitBtn", "[data-testid=submit]"));

        let entry = catalog.get("login.submitBtn").unwrap();
        assert_eq!(entry.primary, "[data-testid=submit]");
        assert!(entry.fallbacks.is_empty());
    }

    #[test]
    fn violations_report_repeated_primary() {
        let entry = CatalogEntry::new(
            "#user",
            vec!["#user".to_string(), ".a".to_string(), ".a".to_string()],
        );
        assert_eq!(entry.violations().len(), 2);
    }

    #[test]
    fn pending_update_uses_wire_field_names() {
        let json = serde_json::to_value(update("login.usernameInput", "[name=username]")).unwrap();
        assert_eq!(json["newSel"], "[name=username]");
        assert_eq!(json["score"], 130);
        assert!(json["ts"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn catalog_document_shape() {
        let raw = r##"{"login.usernameInput": {"primary": "#user", "fallbacks": ["[name=username]"]}}"##;
        let catalog: Catalog = serde_json::from_str(raw).unwrap();
        let entry = catalog.get("login.usernameInput").unwrap();
        assert_eq!(entry.primary, "#user");
        assert_eq!(entry.probe_order().collect::<Vec<_>>(), vec!["#user", "[name=username]"]);
    }
}
