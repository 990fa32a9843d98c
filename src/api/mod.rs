pub mod batch;
pub mod client;
pub mod messages;
pub mod models;

use async_trait::async_trait;

use crate::error::AppResult;

pub use client::GmailClient;
pub use models::{BatchOutcome, FetchFailure, MessagePage, RawMessage, SendResult};

/// The remote mailbox operations the fetcher and outbox depend on.
#[async_trait]
pub trait MailboxApi: Send + Sync {
    /// One page of message ids carrying `label_id`.
    async fn list_messages(
        &self,
        label_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> AppResult<MessagePage>;

    /// Full raw message. A vanished id yields `AppError::NotFound`.
    async fn get_raw(&self, id: &str) -> AppResult<RawMessage>;

    /// Many raw messages in one exchange. Only failure of the exchange itself
    /// is an `Err`; per-message failures are entries of the outcome.
    async fn batch_get_raw(&self, ids: &[String]) -> AppResult<BatchOutcome>;

    async fn send_raw(&self, raw_message: &str, thread_id: Option<&str>) -> AppResult<SendResult>;
}
