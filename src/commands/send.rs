use crate::api::GmailClient;
use crate::cli::SendArgs;
use crate::commands::{attachment_paths, read_body};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::mail::MessageRecord;
use crate::outbox::Outbox;

pub async fn run(ctx: &AppContext, args: SendArgs) -> AppResult<()> {
    let body = read_body(&args.body)?;
    let token = ctx.token().await?;

    let sender = args
        .from
        .clone()
        .or_else(|| ctx.settings.sender.clone())
        .or_else(|| token.email.clone())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            AppError::InvalidInput(
                "unable to determine sender; pass --from or set `sender` in the profile".to_string(),
            )
        })?;

    let record = MessageRecord::outgoing(sender, args.to.clone(), args.subject.clone(), body)
        .with_attachments(attachment_paths(&args.body));

    let outbox = Outbox::new(GmailClient::new(token.access_token));
    let result = outbox.send(&record).await?;

    let text = format!("sent message {}", result.id);
    ctx.output.emit(&text, &result)
}
