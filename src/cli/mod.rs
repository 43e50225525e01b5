pub mod app;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod info;
pub mod output;
pub mod pending;
pub mod review;
pub mod runtime;
pub mod score;

pub use app::run;
pub use review::LineReviewer;
