use action_locator::{score_selector, CatalogEntry, CatalogStore};
use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use super::context::CliContext;
use super::output::print_structured;

#[derive(Args, Clone, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum CatalogCommand {
    /// Show catalog entries with selector scores
    Show {
        /// Only show this key
        key: Option<String>,
    },

    /// Report entries that repeat their primary or a fallback
    Check,
}

#[derive(Debug, Serialize)]
struct ScoredSelector<'a> {
    selector: &'a str,
    score: u32,
}

#[derive(Debug, Serialize)]
struct EntryView<'a> {
    key: &'a str,
    primary: ScoredSelector<'a>,
    fallbacks: Vec<ScoredSelector<'a>>,
}

impl<'a> EntryView<'a> {
    fn new(key: &'a str, entry: &'a CatalogEntry) -> Self {
        let scored = |selector: &'a String| ScoredSelector {
            selector: selector.as_str(),
            score: score_selector(selector),
        };
        Self {
            key,
            primary: scored(&entry.primary),
            fallbacks: entry.fallbacks.iter().map(scored).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Violation<'a> {
    key: &'a str,
    problems: Vec<String>,
}

pub async fn cmd_catalog(args: CatalogArgs, ctx: &CliContext) -> Result<()> {
    let store = ctx.catalog_store();
    let catalog = store.load().await;

    match args.command {
        CatalogCommand::Show { key } => {
            let views: Vec<EntryView<'_>> = catalog
                .iter()
                .filter(|(k, _)| key.as_deref().map_or(true, |wanted| wanted == k.as_str()))
                .map(|(k, entry)| EntryView::new(k, entry))
                .collect();
            if let Some(wanted) = &key {
                if views.is_empty() {
                    bail!("no catalog entry for key: {}", wanted);
                }
            }
            if print_structured(ctx.output(), &views)? {
                return Ok(());
            }
            if views.is_empty() {
                println!("Catalog {} is empty.", store.path().display());
            }
            for view in &views {
                println!("{}", view.key);
                println!("  primary   {:>4}  {}", view.primary.score, view.primary.selector);
                for (idx, fallback) in view.fallbacks.iter().enumerate() {
                    println!(
                        "  fallback{} {:>4}  {}",
                        idx + 1,
                        fallback.score,
                        fallback.selector
                    );
                }
            }
        }
        CatalogCommand::Check => {
            let violations: Vec<Violation<'_>> = catalog
                .iter()
                .filter_map(|(key, entry)| {
                    let problems = entry.violations();
                    (!problems.is_empty()).then_some(Violation {
                        key: key.as_str(),
                        problems,
                    })
                })
                .collect();
            if !print_structured(ctx.output(), &violations)? {
                for violation in &violations {
                    for problem in &violation.problems {
                        println!("{}: {}", violation.key, problem);
                    }
                }
            }
            if !violations.is_empty() {
                bail!("{} catalog entries need attention", violations.len());
            }
            if matches!(ctx.output(), super::output::OutputFormat::Human) {
                println!("Catalog OK ({} entries)", catalog.len());
            }
        }
    }
    Ok(())
}
