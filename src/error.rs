use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("auth error: {0}")]
    Auth(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("message {id} not found")]
    NotFound { id: String },
    #[error("message {id} is malformed: {reason}")]
    MalformedMessage { id: String, reason: String },
    #[error("unable to read attachment {}: {source}", path.display())]
    AttachmentRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to infer a mime type for attachment {}", path.display())]
    AttachmentType { path: PathBuf },
    #[error("batch request failed: {0}")]
    BatchTransport(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    pub fn malformed(id: &str, reason: impl ToString) -> Self {
        Self::MalformedMessage {
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Errors scoped to a single message, which callers may skip and continue.
    /// Auth, config and connection errors are not: they would fail every
    /// message that follows.
    pub fn is_per_message(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::MalformedMessage { .. }
                | Self::Api(_)
                | Self::Json(_)
                | Self::BatchTransport(_)
        )
    }
}
