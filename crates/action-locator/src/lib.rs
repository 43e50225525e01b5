//! Selector healing - catalog-driven element resolution
//!
//! This crate keeps UI tests resilient to selector drift:
//! - A catalog maps logical element keys to a primary selector and ordered fallbacks
//! - The resolver probes the primary, then each fallback in order
//! - A fallback that rescues a key is scored and queued as a suggestion
//! - A human review pass promotes approved suggestions into the catalog

pub mod catalog;
pub mod config;
mod document;
pub mod diagnostics;
pub mod errors;
pub mod probe;
pub mod queue;
pub mod resolver;
pub mod review;
pub mod scoring;
pub mod types;

pub use catalog::*;
pub use config::*;
pub use diagnostics::*;
pub use errors::*;
pub use probe::*;
pub use queue::*;
pub use resolver::*;
pub use review::*;
pub use scoring::*;
pub use types::*;
