use tracing::info;

use crate::api::MailboxApi;
use crate::api::models::SendResult;
use crate::error::AppResult;
use crate::mail::{self, MessageRecord};

/// Composes records and submits them through a mailbox.
///
/// Sending is not idempotent on the provider side: retrying a send can
/// deliver the message twice.
#[derive(Debug)]
pub struct Outbox<A> {
    api: A,
}

impl<A: MailboxApi> Outbox<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn send(&self, record: &MessageRecord) -> AppResult<SendResult> {
        let composed = mail::compose(record)?;
        let result = self
            .api
            .send_raw(&composed.raw, composed.thread_id.as_deref())
            .await?;

        info!(id = %result.id, "message sent");
        Ok(result)
    }

    pub async fn reply(
        &self,
        original: &MessageRecord,
        response: &MessageRecord,
    ) -> AppResult<SendResult> {
        let composed = mail::compose_reply(original, response)?;
        let result = self
            .api
            .send_raw(&composed.raw, composed.thread_id.as_deref())
            .await?;

        info!(id = %result.id, in_reply_to = %original.id, "reply sent");
        Ok(result)
    }
}
