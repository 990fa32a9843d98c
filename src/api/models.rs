use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A message as returned by `messages.get` with `format=raw`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: String,
    #[serde(rename = "labelIds", default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePage {
    pub ids: Vec<String>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendResult {
    pub id: String,
    pub thread_id: Option<String>,
    pub label_ids: Vec<String>,
}

#[derive(Debug)]
pub struct FetchFailure {
    pub id: String,
    pub error: AppError,
}

/// Per-id results of one or more batch exchanges.
///
/// Batch responses are not ordered like the request, so every entry is keyed
/// by the message id it answers.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    items: HashMap<String, Result<RawMessage, AppError>>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: impl Into<String>, result: Result<RawMessage, AppError>) {
        self.items.insert(id.into(), result);
    }

    pub fn merge(&mut self, other: BatchOutcome) {
        self.items.extend(other.items);
    }

    pub fn get(&self, id: &str) -> Option<&Result<RawMessage, AppError>> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn success_count(&self) -> usize {
        self.items.values().filter(|result| result.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.items.values().filter(|result| result.is_err()).count()
    }

    /// Splits the outcome into fetched messages and failures, both in the
    /// order of `ids`. Entries for ids outside `ids` come last.
    pub fn into_ordered(mut self, ids: &[String]) -> (Vec<RawMessage>, Vec<FetchFailure>) {
        let mut messages = Vec::new();
        let mut failures = Vec::new();

        for id in ids {
            match self.items.remove(id) {
                Some(Ok(message)) => messages.push(message),
                Some(Err(error)) => failures.push(FetchFailure {
                    id: id.clone(),
                    error,
                }),
                None => continue,
            }
        }

        for (id, result) in self.items {
            match result {
                Ok(message) => messages.push(message),
                Err(error) => failures.push(FetchFailure { id, error }),
            }
        }

        (messages, failures)
    }
}
