use action_locator::{
    run_review, PendingUpdate, ReviewCursor, ReviewDecision, ReviewError, ReviewOutcome,
    Reviewer, ScriptedReviewer,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::context::CliContext;
use super::output::print_structured;

#[derive(Args, Clone, Debug)]
pub struct ReviewArgs {
    /// Approve every pending update without prompting
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Prompts for each update on a line-based stream
///
/// Answers: `y` approves, `a` approves this and every remaining update,
/// `q` quits without changing anything, anything else rejects. End of input
/// quits.
pub struct LineReviewer<R, W> {
    input: R,
    output: W,
}

impl<R, W> LineReviewer<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    async fn say(&mut self, text: &str) -> Result<(), ReviewError> {
        self.output
            .write_all(text.as_bytes())
            .await
            .map_err(|err| ReviewError::Reviewer(err.to_string()))?;
        self.output
            .flush()
            .await
            .map_err(|err| ReviewError::Reviewer(err.to_string()))
    }
}

pub fn parse_answer(answer: &str) -> ReviewDecision {
    match answer.trim().to_ascii_lowercase().as_str() {
        "q" => ReviewDecision::Abort,
        "a" => ReviewDecision::ApproveAllRemaining,
        "y" => ReviewDecision::Approve,
        _ => ReviewDecision::Reject,
    }
}

fn describe(cursor: ReviewCursor, update: &PendingUpdate) -> String {
    format!(
        "[{}/{}]\nKey: {}\nNew Selector: {}\nScore: {}\nReason: {}\nTimestamp: {}\n\n",
        cursor.index + 1,
        cursor.total,
        update.key,
        update.new_selector,
        update.score,
        update.reason,
        update.ts.to_rfc3339(),
    )
}

#[async_trait]
impl<R, W> Reviewer for LineReviewer<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn decide(
        &mut self,
        cursor: ReviewCursor,
        update: &PendingUpdate,
    ) -> Result<ReviewDecision, ReviewError> {
        self.say(&describe(cursor, update)).await?;
        self.say("Approve this update? (y/n/a=all/q=quit): ").await?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .await
            .map_err(|err| ReviewError::Reviewer(err.to_string()))?;
        let decision = if read == 0 {
            ReviewDecision::Abort
        } else {
            parse_answer(&line)
        };

        match decision {
            ReviewDecision::Approve => self.say("Approved\n\n").await?,
            ReviewDecision::Reject => self.say("Rejected\n\n").await?,
            ReviewDecision::ApproveAllRemaining => self.say("Approved all remaining\n\n").await?,
            ReviewDecision::Abort => self.say("\n").await?,
        }
        Ok(decision)
    }
}

pub async fn cmd_review(args: ReviewArgs, ctx: &CliContext) -> Result<()> {
    let catalog = ctx.catalog_store();
    let queue = ctx.pending_queue();

    let result = if args.yes {
        let mut reviewer = ScriptedReviewer::approve_all();
        run_review(&catalog, &queue, &mut reviewer).await
    } else {
        // keep stdout clean for the JSON/YAML document
        let prompts: Box<dyn AsyncWrite + Unpin + Send> = if ctx.output().is_structured() {
            Box::new(tokio::io::stderr())
        } else {
            Box::new(tokio::io::stdout())
        };
        let mut reviewer = LineReviewer::new(BufReader::new(tokio::io::stdin()), prompts);
        run_review(&catalog, &queue, &mut reviewer).await
    };
    let outcome = result.context("review failed")?;

    if print_structured(ctx.output(), &outcome)? {
        return Ok(());
    }

    match outcome {
        ReviewOutcome::NothingPending => println!("No pending updates to review."),
        ReviewOutcome::Aborted { .. } => println!("Review cancelled. Nothing was changed."),
        ReviewOutcome::Completed(summary) => {
            if !summary.approved.is_empty() {
                println!(
                    "Applied {} update(s) to {}",
                    summary.approved.len(),
                    catalog.path().display()
                );
            }
            if !summary.rejected.is_empty() {
                println!("Rejected {} update(s)", summary.rejected.len());
            }
            println!("Cleared pending updates");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn update(key: &str) -> PendingUpdate {
        PendingUpdate::from_heal(key, "[name=username]", 130, Utc::now())
    }

    #[test]
    fn answers_map_to_decisions() {
        assert_eq!(parse_answer("y\n"), ReviewDecision::Approve);
        assert_eq!(parse_answer(" Y "), ReviewDecision::Approve);
        assert_eq!(parse_answer("a"), ReviewDecision::ApproveAllRemaining);
        assert_eq!(parse_answer("Q"), ReviewDecision::Abort);
        assert_eq!(parse_answer("n"), ReviewDecision::Reject);
        assert_eq!(parse_answer("yes please"), ReviewDecision::Reject);
    }

    #[tokio::test]
    async fn prompts_and_reads_one_line_per_update() {
        let input: &[u8] = b"y\nn\n";
        let mut output = Vec::new();
        let mut reviewer = LineReviewer::new(input, &mut output);

        let cursor = ReviewCursor { index: 0, total: 2 };
        let first = reviewer.decide(cursor, &update("a")).await.unwrap();
        let second = reviewer
            .decide(ReviewCursor { index: 1, total: 2 }, &update("b"))
            .await
            .unwrap();
        drop(reviewer);

        assert_eq!(first, ReviewDecision::Approve);
        assert_eq!(second, ReviewDecision::Reject);
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("[1/2]\nKey: a\nNew Selector: [name=username]\nScore: 130"));
        assert!(shown.contains("Approve this update? (y/n/a=all/q=quit): "));
    }

    #[tokio::test]
    async fn end_of_input_aborts() {
        let input: &[u8] = b"";
        let mut reviewer = LineReviewer::new(input, tokio::io::sink());
        let decision = reviewer
            .decide(ReviewCursor { index: 0, total: 1 }, &update("a"))
            .await
            .unwrap();
        assert_eq!(decision, ReviewDecision::Abort);
    }
}
