use clap::Subcommand;

use super::catalog::CatalogArgs;
use super::config::ConfigArgs;
use super::pending::PendingArgs;
use super::review::ReviewArgs;
use super::score::ScoreArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Review pending selector updates and promote approved ones
    Review(ReviewArgs),

    /// Inspect or clear the pending-update queue
    Pending(PendingArgs),

    /// Inspect the selector catalog
    Catalog(CatalogArgs),

    /// Score selectors with the healing heuristics
    Score(ScoreArgs),

    /// Show or validate configuration
    Config(ConfigArgs),

    /// Show build information and resolved paths
    Info,
}
