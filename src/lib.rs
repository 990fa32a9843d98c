pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod fetcher;
pub mod mail;
pub mod outbox;
pub mod output;

use cli::Cli;
use error::AppResult;

pub use api::{GmailClient, MailboxApi};
pub use fetcher::{FetchMode, Fetcher, UnreadReport};
pub use mail::MessageRecord;
pub use outbox::Outbox;

pub async fn run(cli: Cli) -> AppResult<()> {
    app::run(cli).await
}
