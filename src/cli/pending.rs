use action_locator::PendingQueue;
use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;

use super::context::CliContext;
use super::output::print_structured;

#[derive(Args, Clone, Debug)]
pub struct PendingArgs {
    #[command(subcommand)]
    pub command: PendingCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum PendingCommand {
    /// List pending selector updates
    List,

    /// Drop every pending update without applying it
    Clear,
}

pub async fn cmd_pending(args: PendingArgs, ctx: &CliContext) -> Result<()> {
    let queue = ctx.pending_queue();
    match args.command {
        PendingCommand::List => {
            let pending = queue.drain().await;
            if print_structured(ctx.output(), &pending)? {
                return Ok(());
            }
            if pending.is_empty() {
                println!("No pending updates.");
                return Ok(());
            }
            println!("{} pending update(s):", pending.len());
            for update in &pending {
                println!(
                    "  {:<32} {:>4}  {}  ({})",
                    update.key,
                    update.score,
                    update.new_selector,
                    update.ts.to_rfc3339()
                );
            }
        }
        PendingCommand::Clear => {
            let dropped = queue.drain().await.len();
            queue.clear().await?;
            info!(dropped, path = %queue.path().display(), "pending queue cleared");
            println!("Cleared {} pending update(s)", dropped);
        }
    }
    Ok(())
}
