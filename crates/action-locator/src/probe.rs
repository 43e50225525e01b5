//! Page driver capability consumed by the resolver
//!
//! The engine never executes selectors itself. Anything able to count
//! matches, hand out an element handle, interact with it and dump the current
//! markup can drive resolution: a CDP session, a WebDriver bridge or a test
//! double.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProbeError;

/// Opaque reference to a matched element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Selector the handle was obtained with
    pub selector: String,

    /// Driver-specific node reference
    pub node_ref: String,
}

impl ElementHandle {
    pub fn new(selector: impl Into<String>, node_ref: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            node_ref: node_ref.into(),
        }
    }
}

/// Interaction performed on a resolved element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interaction {
    Click,
    Fill(String),
    Hover,
    Focus,
    Check,
}

impl Interaction {
    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Click => "click",
            Interaction::Fill(_) => "fill",
            Interaction::Hover => "hover",
            Interaction::Focus => "focus",
            Interaction::Check => "check",
        }
    }
}

/// Options forwarded to the driver with an interaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractOptions {
    /// Driver-side wait budget; `None` uses the driver default
    pub timeout: Option<Duration>,
}

impl InteractOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Page probe trait
///
/// Every method may fail with [`ProbeError::InvalidSelector`] when the driver
/// cannot evaluate a selector against the current page.
#[async_trait]
pub trait PageProbe: Send + Sync {
    /// Number of elements currently matching `selector`
    async fn count(&self, selector: &str) -> Result<usize, ProbeError>;

    /// Handle to the first element matching `selector`
    async fn first(&self, selector: &str) -> Result<ElementHandle, ProbeError>;

    /// Perform `action` on a previously obtained handle
    async fn interact(
        &self,
        handle: &ElementHandle,
        action: &Interaction,
        options: &InteractOptions,
    ) -> Result<(), ProbeError>;

    /// Full markup of the current page
    async fn current_markup(&self) -> Result<String, ProbeError>;
}
