//! Error types for the healing engine

use std::path::PathBuf;

use thiserror::Error;

/// Resolution error enumeration
#[derive(Debug, Error, Clone)]
pub enum LocatorError {
    /// No catalog entry is configured for the key
    #[error("No selector configured for key: {0}")]
    NoCatalogEntry(String),

    /// Primary and every fallback matched nothing
    #[error("All selectors failed for key '{key}' (primary: {primary}, attempted: {attempted})")]
    SelectorsExhausted {
        key: String,
        primary: String,
        attempted: usize,
    },

    /// Raised by resolve-and-interact when no handle could be produced
    #[error("Element not resolvable for key: {0}")]
    ElementNotResolvable(String),

    /// The element was resolved but the interaction itself failed
    #[error("Interaction on '{key}' via {selector} failed: {reason}")]
    InteractionFailed {
        key: String,
        selector: String,
        reason: String,
    },
}

impl LocatorError {
    /// Check if the failure comes from missing catalog configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, LocatorError::NoCatalogEntry(_))
    }

    /// Logical key the error refers to
    pub fn key(&self) -> &str {
        match self {
            LocatorError::NoCatalogEntry(key)
            | LocatorError::ElementNotResolvable(key)
            | LocatorError::SelectorsExhausted { key, .. }
            | LocatorError::InteractionFailed { key, .. } => key,
        }
    }
}

/// Errors reported by a page driver while probing or interacting
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// Selector syntax is invalid or unsupported by the driver
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Driver-level failure
    #[error("Driver error: {0}")]
    Driver(String),

    /// The driver gave up waiting
    #[error("Probe timeout: {0}")]
    Timeout(String),
}

/// Write-side failures of the catalog and queue stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures of the best-effort diagnostic capture
#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("markup unavailable: {0}")]
    Markup(#[from] ProbeError),
}

/// Review workflow failures
#[derive(Debug, Error)]
pub enum ReviewError {
    /// The reviewer capability could not produce a decision
    #[error("reviewer failed: {0}")]
    Reviewer(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors surfaced while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to deserialize config: {0}")]
    Deserialize(String),
}
