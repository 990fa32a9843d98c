#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;

use gmail_unread::api::MailboxApi;
use gmail_unread::api::models::{BatchOutcome, MessagePage, RawMessage, SendResult};
use gmail_unread::error::{AppError, AppResult};

pub fn raw_email(subject: &str, from: &str, to: &str, body: &str) -> String {
    let payload = format!(
        "Message-ID: <{subject}@example.com>\r\nFrom: {from}\r\nTo: {to}\r\nSubject: {subject}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{body}"
    );
    URL_SAFE.encode(payload.as_bytes())
}

#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub thread_id: String,
    pub label_ids: Vec<String>,
    pub raw: String,
}

/// In-memory mailbox that pages by offset and answers batches in reverse
/// order. Selected ids and batch calls can be made to fail.
#[derive(Debug, Default)]
pub struct FakeMailbox {
    pub messages: BTreeMap<String, StoredMessage>,
    /// Listed but deleted before they can be fetched.
    pub gone: HashSet<String>,
    /// Fetching these answers with an auth error, as an expired token would.
    pub unauthorized: HashSet<String>,
    /// Zero-based batch calls whose exchange fails with a transport error.
    pub failing_batches: HashSet<usize>,
    pub list_calls: Mutex<Vec<Option<String>>>,
    pub get_calls: Mutex<Vec<String>>,
    pub batch_calls: Mutex<Vec<Vec<String>>>,
    pub sent: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, labels: &[&str], raw: String) {
        self.messages.insert(
            id.to_string(),
            StoredMessage {
                thread_id: format!("thread-{id}"),
                label_ids: labels.iter().map(|label| label.to_string()).collect(),
                raw,
            },
        );
    }

    pub fn insert_unread(&mut self, id: &str) {
        let raw = raw_email(id, "sender@example.com", "me@example.com", "body");
        self.insert(id, &["UNREAD", "INBOX"], raw);
    }

    fn lookup(&self, id: &str) -> AppResult<RawMessage> {
        if self.unauthorized.contains(id) {
            return Err(AppError::Auth(format!("token rejected while fetching {id}")));
        }

        if self.gone.contains(id) {
            return Err(AppError::NotFound { id: id.to_string() });
        }

        let stored = self
            .messages
            .get(id)
            .ok_or_else(|| AppError::NotFound { id: id.to_string() })?;

        Ok(RawMessage {
            id: id.to_string(),
            thread_id: stored.thread_id.clone(),
            label_ids: stored.label_ids.clone(),
            raw: stored.raw.clone(),
        })
    }
}

#[async_trait]
impl MailboxApi for FakeMailbox {
    async fn list_messages(
        &self,
        label_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> AppResult<MessagePage> {
        self.list_calls
            .lock()
            .expect("lock")
            .push(page_token.map(ToOwned::to_owned));

        let matching = self
            .messages
            .iter()
            .filter(|(_, message)| message.label_ids.iter().any(|label| label == label_id))
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();

        let offset = page_token.map_or(0, |token| token.parse::<usize>().expect("offset token"));
        let end = (offset + page_size as usize).min(matching.len());

        Ok(MessagePage {
            ids: matching[offset..end].to_vec(),
            next_page_token: (end < matching.len()).then(|| end.to_string()),
        })
    }

    async fn get_raw(&self, id: &str) -> AppResult<RawMessage> {
        self.get_calls.lock().expect("lock").push(id.to_string());
        self.lookup(id)
    }

    async fn batch_get_raw(&self, ids: &[String]) -> AppResult<BatchOutcome> {
        let call = {
            let mut calls = self.batch_calls.lock().expect("lock");
            calls.push(ids.to_vec());
            calls.len() - 1
        };

        if self.failing_batches.contains(&call) {
            return Err(AppError::BatchTransport("connection reset".to_string()));
        }

        let mut outcome = BatchOutcome::new();
        for id in ids.iter().rev() {
            outcome.record(id.clone(), self.lookup(id));
        }
        Ok(outcome)
    }

    async fn send_raw(&self, raw_message: &str, thread_id: Option<&str>) -> AppResult<SendResult> {
        let mut sent = self.sent.lock().expect("lock");
        sent.push((raw_message.to_string(), thread_id.map(ToOwned::to_owned)));

        Ok(SendResult {
            id: format!("sent-{}", sent.len()),
            thread_id: Some(thread_id.unwrap_or("new-thread").to_string()),
            label_ids: vec!["SENT".to_string()],
        })
    }
}
