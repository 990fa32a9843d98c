//! Gmail batch exchange: many `messages.get` calls carried in one
//! `multipart/mixed` HTTP request.
//!
//! Each sub-request is tagged `Content-ID: <item-N>` and Google answers with
//! `Content-ID: <response-item-N>`, in no particular order.

use mailparse::{MailHeaderMap, ParsedMail};
use reqwest::StatusCode;
use tracing::warn;

use crate::error::{AppError, AppResult};

use super::client::map_api_error;
use super::messages;
use super::models::{BatchOutcome, RawMessage};

/// Gmail rejects batches with more sub-requests than this.
pub const MAX_BATCH_SIZE: usize = 100;

const CONTENT_ID_PREFIX: &str = "item-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPart {
    pub content_id: Option<String>,
    pub status: u16,
    pub body: String,
}

pub fn build_batch_body(ids: &[String], boundary: &str) -> String {
    let mut out = String::new();

    for (index, id) in ids.iter().enumerate() {
        out.push_str(&format!("--{boundary}\r\n"));
        out.push_str("Content-Type: application/http\r\n");
        out.push_str(&format!("Content-ID: <{CONTENT_ID_PREFIX}{index}>\r\n\r\n"));
        out.push_str(&format!("GET {}\r\n\r\n", messages::raw_get_target(id)));
    }

    out.push_str(&format!("--{boundary}--\r\n"));
    out
}

pub fn parse_batch_response(content_type: &str, body: &str) -> AppResult<Vec<BatchPart>> {
    let ctype = mailparse::parse_content_type(content_type);
    if !ctype.mimetype.eq_ignore_ascii_case("multipart/mixed") {
        return Err(AppError::BatchTransport(format!(
            "unexpected batch response content type `{content_type}`"
        )));
    }

    if !ctype.params.contains_key("boundary") {
        return Err(AppError::BatchTransport(
            "batch response content type has no boundary".to_string(),
        ));
    }

    let envelope = format!("Content-Type: {content_type}\r\n\r\n{body}");
    let parsed = mailparse::parse_mail(envelope.as_bytes()).map_err(|err| {
        AppError::BatchTransport(format!("unparseable batch response: {err}"))
    })?;

    let mut parts = Vec::with_capacity(parsed.subparts.len());
    for subpart in &parsed.subparts {
        match parse_part(subpart) {
            Some(part) => parts.push(part),
            None => warn!("skipping unparseable batch response part"),
        }
    }

    Ok(parts)
}

/// Pairs each response part with the id it answers. Every id in `ids` ends up
/// with exactly one entry.
pub fn collect_outcome(ids: &[String], parts: Vec<BatchPart>) -> BatchOutcome {
    let mut outcome = BatchOutcome::new();

    for part in parts {
        let Some(id) = part
            .content_id
            .as_deref()
            .and_then(item_index)
            .and_then(|index| ids.get(index))
        else {
            warn!(content_id = ?part.content_id, "batch response part matches no request");
            continue;
        };

        outcome.record(id.clone(), part_result(id, &part));
    }

    for id in ids {
        if !outcome.contains(id) {
            outcome.record(
                id.clone(),
                Err(AppError::Api(format!(
                    "batch response carried no result for message {id}"
                ))),
            );
        }
    }

    outcome
}

fn part_result(id: &str, part: &BatchPart) -> Result<RawMessage, AppError> {
    let status = StatusCode::from_u16(part.status).unwrap_or(StatusCode::BAD_GATEWAY);
    if !status.is_success() {
        return Err(map_api_error(status, &part.body, Some(id)));
    }

    serde_json::from_str::<RawMessage>(&part.body).map_err(AppError::from)
}

fn parse_part(subpart: &ParsedMail<'_>) -> Option<BatchPart> {
    let content_id = subpart.get_headers().get_first_value("Content-ID");
    let raw = subpart.get_body_raw().ok()?;
    let http_response = String::from_utf8_lossy(&raw);
    let http_response = http_response.trim_start_matches(['\r', '\n']);

    let (head, body) = split_head(http_response).unwrap_or((http_response, ""));
    let status_line = head.lines().next()?;
    let status = status_line.split_whitespace().nth(1)?.parse::<u16>().ok()?;

    Some(BatchPart {
        content_id,
        status,
        body: body.trim().to_string(),
    })
}

fn split_head(input: &str) -> Option<(&str, &str)> {
    if let Some(index) = input.find("\r\n\r\n") {
        return Some((&input[..index], &input[index + 4..]));
    }

    input
        .find("\n\n")
        .map(|index| (&input[..index], &input[index + 2..]))
}

fn item_index(content_id: &str) -> Option<usize> {
    let value = content_id.trim().trim_start_matches('<').trim_end_matches('>');
    let value = value.strip_prefix("response-").unwrap_or(value);
    value.strip_prefix(CONTENT_ID_PREFIX)?.parse().ok()
}
