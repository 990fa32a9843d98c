use std::collections::BTreeSet;

use serde::Serialize;

/// Simplified view of one email, exchanged with callers in both directions.
///
/// On inbound records `attachments` holds the filenames found in the
/// message; on outbound records it holds filesystem paths to attach.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    pub id: String,
    pub thread_id: String,
    pub message_id: String,
    pub label_ids: BTreeSet<String>,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<String>,
}

impl MessageRecord {
    pub fn outgoing(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_attachments<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attachments = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_label(&self, label_id: &str) -> bool {
        self.label_ids.contains(label_id)
    }
}
