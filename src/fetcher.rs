use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::api::MailboxApi;
use crate::api::batch::MAX_BATCH_SIZE;
use crate::api::messages::UNREAD_LABEL;
use crate::api::models::{BatchOutcome, FetchFailure, RawMessage};
use crate::error::{AppError, AppResult};
use crate::mail::{MessageRecord, simplify};

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// One batch exchange per chunk of ids.
    Batched,
    /// One `messages.get` per id.
    Sequential,
}

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub page_size: u32,
    pub batch_size: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Default)]
pub struct UnreadReport {
    pub messages: Vec<MessageRecord>,
    pub failures: Vec<FetchFailure>,
}

/// Reads unread messages from a mailbox.
#[derive(Debug)]
pub struct Fetcher<A> {
    api: A,
    options: FetchOptions,
}

impl<A: MailboxApi> Fetcher<A> {
    pub fn new(api: A) -> Self {
        Self::with_options(api, FetchOptions::default())
    }

    pub fn with_options(api: A, options: FetchOptions) -> Self {
        let options = FetchOptions {
            page_size: options.page_size.max(1),
            batch_size: options.batch_size.clamp(1, MAX_BATCH_SIZE),
        };
        Self { api, options }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Lazily pages through the ids of unread messages.
    pub fn unread_ids(&self) -> UnreadIds<'_, A> {
        UnreadIds {
            api: &self.api,
            page_size: self.options.page_size,
            buffer: VecDeque::new(),
            next_page_token: None,
            exhausted: false,
        }
    }

    /// Every unread message id, across all pages.
    pub async fn list_unread_ids(&self) -> AppResult<Vec<String>> {
        let mut pager = self.unread_ids();
        let mut ids = Vec::new();
        while let Some(id) = pager.next().await? {
            ids.push(id);
        }
        Ok(ids)
    }

    pub async fn fetch_raw(&self, id: &str) -> AppResult<RawMessage> {
        self.api.get_raw(id).await
    }

    /// Fetches `ids` in as few batch exchanges as the batch size allows.
    ///
    /// A chunk whose exchange fails records a `BatchTransport` failure for
    /// each of its ids, so earlier and later chunks keep their results. The
    /// call itself fails only when no exchange completed, or on an auth error.
    pub async fn fetch_raw_batch(&self, ids: &[String]) -> AppResult<BatchOutcome> {
        let mut outcome = BatchOutcome::new();
        let mut failed_chunks = Vec::new();
        let mut completed = 0usize;

        for chunk in ids.chunks(self.options.batch_size) {
            debug!(count = chunk.len(), "fetching batch chunk");
            match self.api.batch_get_raw(chunk).await {
                Ok(chunk_outcome) => {
                    outcome.merge(chunk_outcome);
                    completed += 1;
                }
                Err(AppError::BatchTransport(reason)) => {
                    warn!(count = chunk.len(), %reason, "batch chunk failed");
                    failed_chunks.push((chunk, reason));
                }
                Err(error) => return Err(error),
            }
        }

        if completed == 0 {
            if let Some((_, reason)) = failed_chunks.into_iter().next() {
                return Err(AppError::BatchTransport(reason));
            }
            return Ok(outcome);
        }

        for (chunk, reason) in failed_chunks {
            for id in chunk {
                outcome.record(id.clone(), Err(AppError::BatchTransport(reason.clone())));
            }
        }

        debug!(
            fetched = outcome.success_count(),
            failed = outcome.failure_count(),
            "batch fetch finished"
        );
        Ok(outcome)
    }

    /// Lists, fetches and simplifies every unread message. Failures scoped
    /// to one message are reported next to the fetched ones; anything else,
    /// such as an auth error, aborts the run in either mode.
    pub async fn unread_messages(&self, mode: FetchMode) -> AppResult<UnreadReport> {
        let ids = self.list_unread_ids().await?;
        info!(count = ids.len(), ?mode, "fetching unread messages");

        let (raw_messages, mut failures) = match mode {
            FetchMode::Batched => self.fetch_batched(&ids).await?,
            FetchMode::Sequential => self.fetch_sequential(&ids).await?,
        };

        let mut messages = Vec::with_capacity(raw_messages.len());
        for raw in &raw_messages {
            match simplify(raw) {
                Ok(record) => messages.push(record),
                Err(error) if error.is_per_message() => failures.push(FetchFailure {
                    id: raw.id.clone(),
                    error,
                }),
                Err(error) => return Err(error),
            }
        }

        for failure in &failures {
            warn!(id = %failure.id, error = %failure.error, "skipping message");
        }

        Ok(UnreadReport { messages, failures })
    }

    async fn fetch_batched(
        &self,
        ids: &[String],
    ) -> AppResult<(Vec<RawMessage>, Vec<FetchFailure>)> {
        let (messages, mut failures) = self.fetch_raw_batch(ids).await?.into_ordered(ids);

        if let Some(index) = failures
            .iter()
            .position(|failure| !failure.error.is_per_message())
        {
            return Err(failures.swap_remove(index).error);
        }

        Ok((messages, failures))
    }

    async fn fetch_sequential(
        &self,
        ids: &[String],
    ) -> AppResult<(Vec<RawMessage>, Vec<FetchFailure>)> {
        let mut messages = Vec::new();
        let mut failures = Vec::new();

        for id in ids {
            match self.fetch_raw(id).await {
                Ok(message) => messages.push(message),
                Err(error) if error.is_per_message() => failures.push(FetchFailure {
                    id: id.clone(),
                    error,
                }),
                Err(error) => return Err(error),
            }
        }

        Ok((messages, failures))
    }
}

/// Pager over unread ids; requests the next page only once the current one
/// is drained, and stops when the provider returns no page token.
pub struct UnreadIds<'a, A> {
    api: &'a A,
    page_size: u32,
    buffer: VecDeque<String>,
    next_page_token: Option<String>,
    exhausted: bool,
}

impl<A: MailboxApi> UnreadIds<'_, A> {
    pub async fn next(&mut self) -> AppResult<Option<String>> {
        loop {
            if let Some(id) = self.buffer.pop_front() {
                return Ok(Some(id));
            }

            if self.exhausted {
                return Ok(None);
            }

            let page = self
                .api
                .list_messages(UNREAD_LABEL, self.page_size, self.next_page_token.as_deref())
                .await?;
            debug!(count = page.ids.len(), more = page.next_page_token.is_some(), "listed page");

            self.buffer.extend(page.ids);
            self.exhausted = page.next_page_token.is_none();
            self.next_page_token = page.next_page_token;
        }
    }
}
