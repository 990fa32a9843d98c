use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::api::batch::MAX_BATCH_SIZE;
use crate::error::{AppError, AppResult};
use crate::fetcher::{DEFAULT_BATCH_SIZE, DEFAULT_PAGE_SIZE, FetchMode, FetchOptions};

/// Gmail caps `maxResults` for `messages.list` at this value.
const MAX_PAGE_SIZE: u32 = 500;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub use_batch: Option<bool>,
    #[serde(default)]
    pub sender: Option<String>,
}

impl Settings {
    pub fn client_id(&self) -> AppResult<&str> {
        self.client_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                AppError::Config(
                    "missing oauth client_id in profile settings; it is required to refresh tokens"
                        .to_string(),
                )
            })
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            page_size: self
                .page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            batch_size: self
                .batch_size
                .unwrap_or(DEFAULT_BATCH_SIZE)
                .clamp(1, MAX_BATCH_SIZE),
        }
    }

    pub fn fetch_mode(&self) -> FetchMode {
        if self.use_batch.unwrap_or(true) {
            FetchMode::Batched
        } else {
            FetchMode::Sequential
        }
    }
}

pub fn load(path: PathBuf) -> AppResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)?;
    let settings = serde_json::from_str(&raw)?;
    Ok(settings)
}
