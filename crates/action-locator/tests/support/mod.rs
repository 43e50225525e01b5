use std::collections::{HashMap, HashSet};

use action_locator::{ElementHandle, InteractOptions, Interaction, PageProbe, ProbeError};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Page double with fixed match counts that records every probe
#[derive(Default)]
pub struct FakePage {
    counts: HashMap<String, usize>,
    invalid: HashSet<String>,
    markup: Option<String>,
    probed: Mutex<Vec<String>>,
    interactions: Mutex<Vec<(String, Interaction)>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            markup: Some("<html><body><form id=\"login\"></form></body></html>".to_string()),
            ..Self::default()
        }
    }

    pub fn matching(mut self, selector: &str, count: usize) -> Self {
        self.counts.insert(selector.to_string(), count);
        self
    }

    pub fn invalid(mut self, selector: &str) -> Self {
        self.invalid.insert(selector.to_string());
        self
    }

    pub fn without_markup(mut self) -> Self {
        self.markup = None;
        self
    }

    pub fn probed(&self) -> Vec<String> {
        self.probed.lock().clone()
    }

    pub fn interactions(&self) -> Vec<(String, Interaction)> {
        self.interactions.lock().clone()
    }
}

#[async_trait]
impl PageProbe for FakePage {
    async fn count(&self, selector: &str) -> Result<usize, ProbeError> {
        self.probed.lock().push(selector.to_string());
        if self.invalid.contains(selector) {
            return Err(ProbeError::InvalidSelector {
                selector: selector.to_string(),
                reason: "unsupported pseudo-class".to_string(),
            });
        }
        Ok(self.counts.get(selector).copied().unwrap_or(0))
    }

    async fn first(&self, selector: &str) -> Result<ElementHandle, ProbeError> {
        Ok(ElementHandle::new(selector, format!("node:{}", selector)))
    }

    async fn interact(
        &self,
        handle: &ElementHandle,
        action: &Interaction,
        _options: &InteractOptions,
    ) -> Result<(), ProbeError> {
        self.interactions
            .lock()
            .push((handle.selector.clone(), action.clone()));
        Ok(())
    }

    async fn current_markup(&self) -> Result<String, ProbeError> {
        self.markup
            .clone()
            .ok_or_else(|| ProbeError::Driver("page closed".to_string()))
    }
}
