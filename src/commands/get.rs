use crate::cli::GetArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::fetcher::Fetcher;
use crate::mail::simplify;
use crate::output::text::format_record;

pub async fn run(ctx: &AppContext, args: GetArgs) -> AppResult<()> {
    let fetcher = Fetcher::new(ctx.gmail_client().await?);
    let raw = fetcher.fetch_raw(&args.id).await?;
    let record = simplify(&raw)?;

    ctx.output.emit(&format_record(&record), &record)
}
