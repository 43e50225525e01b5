use action_locator::{explain_score, ScoreBreakdown};
use anyhow::Result;
use clap::Args;

use super::context::CliContext;
use super::output::print_structured;

#[derive(Args, Clone, Debug)]
pub struct ScoreArgs {
    /// Selectors to score
    #[arg(required = true, value_name = "SELECTOR")]
    pub selectors: Vec<String>,

    /// List the rules that contributed to each score
    #[arg(long)]
    pub explain: bool,
}

pub fn cmd_score(args: ScoreArgs, ctx: &CliContext) -> Result<()> {
    let breakdowns: Vec<ScoreBreakdown> = args
        .selectors
        .iter()
        .map(|selector| explain_score(selector))
        .collect();
    if print_structured(ctx.output(), &breakdowns)? {
        return Ok(());
    }

    for breakdown in &breakdowns {
        println!("{:>4}  {}", breakdown.total, breakdown.selector);
        if args.explain {
            println!("      base {:+}", breakdown.base);
            for rule in &breakdown.applied {
                println!("      {} {:+}", rule.name(), rule.delta());
            }
        }
    }
    Ok(())
}
