use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{AppError, AppResult};
use crate::mail::mime;

use super::MailboxApi;
use super::batch;
use super::messages;
use super::models::{BatchOutcome, MessagePage, RawMessage, SendResult};

const GMAIL_API_BASE_URL: &str = "https://gmail.googleapis.com";

/// Gmail REST client bound to an already-authorized access token.
#[derive(Debug, Clone)]
pub struct GmailClient {
    http: Client,
    base_url: String,
    access_token: String,
}

impl GmailClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: GMAIL_API_BASE_URL.to_string(),
            access_token: access_token.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Option<&[(String, String)]>,
        id: Option<&str>,
    ) -> AppResult<T> {
        let url = self.endpoint_url(endpoint)?;
        let mut request = self.http.get(url).bearer_auth(&self.access_token);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await?;
        self.parse_json_response(response, id).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> AppResult<T> {
        let url = self.endpoint_url(endpoint)?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;

        self.parse_json_response(response, None).await
    }

    fn endpoint_url(&self, endpoint: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.set_path(endpoint.trim_start_matches('/'));
        Ok(url)
    }

    async fn parse_json_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        id: Option<&str>,
    ) -> AppResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_api_error(status, &body, id))
    }
}

#[async_trait]
impl MailboxApi for GmailClient {
    async fn list_messages(
        &self,
        label_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> AppResult<MessagePage> {
        let query = messages::list_query(label_id, page_size, page_token);
        let resource: GmailMessageListResource = self
            .get_json(messages::list_endpoint(), Some(&query), None)
            .await?;

        Ok(resource.into_page())
    }

    async fn get_raw(&self, id: &str) -> AppResult<RawMessage> {
        let endpoint = messages::message_endpoint(id);
        let query = messages::get_query();
        self.get_json(&endpoint, Some(&query), Some(id)).await
    }

    async fn batch_get_raw(&self, ids: &[String]) -> AppResult<BatchOutcome> {
        if ids.is_empty() {
            return Ok(BatchOutcome::new());
        }

        let boundary = mime::random_boundary("batch");
        let body = batch::build_batch_body(ids, &boundary);
        let url = self.endpoint_url(messages::batch_endpoint())?;
        debug!(count = ids.len(), "sending batch request");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, format!("multipart/mixed; boundary={boundary}"))
            .body(body)
            .send()
            .await
            .map_err(|err| AppError::BatchTransport(err.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = response
            .text()
            .await
            .map_err(|err| AppError::BatchTransport(err.to_string()))?;

        if !status.is_success() {
            return Err(batch_status_error(status, &text));
        }

        let parts = batch::parse_batch_response(&content_type, &text)?;
        Ok(batch::collect_outcome(ids, parts))
    }

    async fn send_raw(&self, raw_message: &str, thread_id: Option<&str>) -> AppResult<SendResult> {
        let request = GmailSendRequest {
            raw: raw_message.to_string(),
            thread_id: thread_id.map(ToOwned::to_owned),
        };
        let response: GmailSendResponse =
            self.post_json(messages::send_endpoint(), &request).await?;

        Ok(SendResult {
            id: response.id,
            thread_id: response.thread_id,
            label_ids: response.label_ids.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GmailMessageListResource {
    messages: Option<Vec<GmailMessageListEntry>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

impl GmailMessageListResource {
    fn into_page(self) -> MessagePage {
        MessagePage {
            ids: self
                .messages
                .unwrap_or_default()
                .into_iter()
                .map(|entry| entry.id)
                .collect(),
            next_page_token: self.next_page_token.filter(|token| !token.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GmailMessageListEntry {
    id: String,
}

#[derive(Debug, Serialize)]
struct GmailSendRequest {
    raw: String,
    #[serde(rename = "threadId", skip_serializing_if = "Option::is_none")]
    thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GmailSendResponse {
    id: String,
    #[serde(rename = "threadId")]
    thread_id: Option<String>,
    #[serde(rename = "labelIds")]
    label_ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GmailApiErrorEnvelope {
    error: GmailApiError,
}

#[derive(Debug, Deserialize)]
struct GmailApiError {
    code: Option<u16>,
    status: Option<String>,
    message: Option<String>,
    errors: Option<Vec<GmailApiErrorDetail>>,
}

#[derive(Debug, Deserialize)]
struct GmailApiErrorDetail {
    reason: Option<String>,
}

/// Maps a non-success response to an error. `id` names the message the
/// request targeted, so a 404 can be reported as that message vanishing.
pub(crate) fn map_api_error(status: StatusCode, body: &str, id: Option<&str>) -> AppError {
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return AppError::NotFound { id: id.to_string() };
        }
    }

    let message = parse_api_error_message(body).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            "no error details in response body".to_string()
        } else {
            body.to_string()
        }
    });

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return AppError::Auth(format!(
            "gmail api authorization failed ({status}): {message}. refresh or replace the stored token"
        ));
    }

    AppError::Api(format!("gmail api request failed ({status}): {message}"))
}

/// A rejected batch envelope fails the whole exchange. Auth failures keep
/// their own variant so callers can tell a bad token from a bad transport.
fn batch_status_error(status: StatusCode, body: &str) -> AppError {
    match map_api_error(status, body, None) {
        AppError::Auth(message) => AppError::Auth(message),
        other => AppError::BatchTransport(other.to_string()),
    }
}

fn parse_api_error_message(body: &str) -> Option<String> {
    let envelope = serde_json::from_str::<GmailApiErrorEnvelope>(body).ok()?;
    let mut parts = Vec::new();

    if let Some(message) = envelope.error.message {
        parts.push(message);
    }

    if let Some(status) = envelope.error.status {
        parts.push(format!("status={status}"));
    }

    if let Some(code) = envelope.error.code {
        parts.push(format!("code={code}"));
    }

    if let Some(reason) = envelope
        .error
        .errors
        .and_then(|errors| errors.into_iter().find_map(|detail| detail.reason))
    {
        parts.push(format!("reason={reason}"));
    }

    if parts.is_empty() {
        return None;
    }

    Some(parts.join(", "))
}
