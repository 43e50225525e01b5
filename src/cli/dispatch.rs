use super::catalog::cmd_catalog;
use super::config::cmd_config;
use super::env::CliArgs;
use super::info::cmd_info;
use super::pending::cmd_pending;
use super::review::cmd_review;
use super::score::cmd_score;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Review(args) => cmd_review(args, ctx).await,
        Commands::Pending(args) => cmd_pending(args, ctx).await,
        Commands::Catalog(args) => cmd_catalog(args, ctx).await,
        Commands::Score(args) => cmd_score(args, ctx),
        Commands::Config(args) => cmd_config(args, ctx).await,
        Commands::Info => cmd_info(ctx),
    }
}
