use crate::cli::ReplyArgs;
use crate::commands::{attachment_paths, read_body};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::fetcher::Fetcher;
use crate::mail::{MessageRecord, simplify};
use crate::outbox::Outbox;

pub async fn run(ctx: &AppContext, args: ReplyArgs) -> AppResult<()> {
    let body = read_body(&args.body)?;
    let client = ctx.gmail_client().await?;

    let original = simplify(&Fetcher::new(client.clone()).fetch_raw(&args.id).await?)?;
    let response = MessageRecord {
        body,
        attachments: attachment_paths(&args.body),
        ..MessageRecord::default()
    };

    let result = Outbox::new(client).reply(&original, &response).await?;

    let text = format!(
        "sent reply {} in thread {}",
        result.id,
        result.thread_id.as_deref().unwrap_or(&original.thread_id)
    );
    ctx.output.emit(&text, &result)
}
