use serde::Serialize;

use crate::cli::UnreadArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::fetcher::{FetchMode, Fetcher, UnreadReport};
use crate::mail::MessageRecord;
use crate::output::OutputMode;
use crate::output::text::{format_record, separator};

#[derive(Debug, Serialize)]
struct UnreadView<'a> {
    messages: &'a [MessageRecord],
    failures: Vec<FailureView>,
}

#[derive(Debug, Serialize)]
struct FailureView {
    id: String,
    error: String,
}

pub async fn run(ctx: &AppContext, args: UnreadArgs) -> AppResult<()> {
    let client = ctx.gmail_client().await?;
    let fetcher = Fetcher::with_options(client, ctx.settings.fetch_options());
    let mode = resolve_mode(&args, ctx.settings.fetch_mode());
    let report = fetcher.unread_messages(mode).await?;

    if ctx.output.mode() == OutputMode::Text {
        for failure in &report.failures {
            eprintln!("skipped {}: {}", failure.id, failure.error);
        }
        println!("{}", render_text(&report));
        return Ok(());
    }

    let view = UnreadView {
        messages: &report.messages,
        failures: report
            .failures
            .iter()
            .map(|failure| FailureView {
                id: failure.id.clone(),
                error: failure.error.to_string(),
            })
            .collect(),
    };
    ctx.output.emit("", &view)
}

fn resolve_mode(args: &UnreadArgs, configured: FetchMode) -> FetchMode {
    if args.no_batch {
        FetchMode::Sequential
    } else if args.batch {
        FetchMode::Batched
    } else {
        configured
    }
}

fn render_text(report: &UnreadReport) -> String {
    let mut blocks = Vec::new();
    for record in &report.messages {
        blocks.push(format_record(record));
        blocks.push(separator());
    }

    let mut summary = format!("{} unread messages", report.messages.len());
    if !report.failures.is_empty() {
        summary.push_str(&format!(" ({} skipped)", report.failures.len()));
    }
    blocks.push(summary);
    blocks.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::FetchFailure;
    use crate::error::AppError;

    #[test]
    fn flags_override_configured_mode() {
        let args = UnreadArgs {
            batch: false,
            no_batch: true,
        };
        assert_eq!(resolve_mode(&args, FetchMode::Batched), FetchMode::Sequential);

        let args = UnreadArgs {
            batch: false,
            no_batch: false,
        };
        assert_eq!(resolve_mode(&args, FetchMode::Sequential), FetchMode::Sequential);

        let args = UnreadArgs {
            batch: true,
            no_batch: false,
        };
        assert_eq!(resolve_mode(&args, FetchMode::Sequential), FetchMode::Batched);
    }

    #[test]
    fn summary_counts_skipped_messages() {
        let report = UnreadReport {
            messages: vec![MessageRecord::default()],
            failures: vec![FetchFailure {
                id: "gone".to_string(),
                error: AppError::NotFound {
                    id: "gone".to_string(),
                },
            }],
        };

        let text = render_text(&report);
        assert!(text.ends_with("1 unread messages (1 skipped)"));
        assert!(text.contains(&separator()));
    }
}
