//! selfheal command-line library
//!
//! Exposes the CLI modules for integration testing

pub mod cli;

pub use cli::LineReviewer;
