use std::fs;
use std::io;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use serde::Serialize;

use crate::error::{AppError, AppResult};

use super::record::MessageRecord;

const REPLY_PREFIX: &str = "Re: ";
const ENCODED_WORD_CHUNK: usize = 45;

/// A provider-ready outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedMessage {
    /// Base64url RFC 5322 message, as the `raw` field of a send request.
    pub raw: String,
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

pub fn compose(record: &MessageRecord) -> AppResult<ComposedMessage> {
    let attachments = read_attachments(&record.attachments)?;
    let headers = build_base_headers(record);

    Ok(ComposedMessage {
        raw: build_raw_message(headers, &record.body, &attachments),
        thread_id: None,
    })
}

/// Composes `response` as a reply to `original`, threaded through the
/// original's `Message-Id` and thread id.
pub fn compose_reply(
    original: &MessageRecord,
    response: &MessageRecord,
) -> AppResult<ComposedMessage> {
    let reply = reply_record(original, response);
    let attachments = read_attachments(&reply.attachments)?;
    let mut headers = build_base_headers(&reply);

    let message_id = sanitize_header_value(&original.message_id);
    if !message_id.is_empty() {
        headers.push(format!("References: {message_id}"));
        headers.push(format!("In-Reply-To: {message_id}"));
    }

    let thread_id = Some(original.thread_id.trim())
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    Ok(ComposedMessage {
        raw: build_raw_message(headers, &reply.body, &attachments),
        thread_id,
    })
}

/// The record a reply is composed from: addressed back to the original
/// sender, from the original recipient.
pub fn reply_record(original: &MessageRecord, response: &MessageRecord) -> MessageRecord {
    MessageRecord {
        sender: original.recipient.clone(),
        recipient: original.sender.clone(),
        subject: format!("{REPLY_PREFIX}{}", original.subject),
        body: response.body.clone(),
        attachments: response.attachments.clone(),
        ..MessageRecord::default()
    }
}

/// Reads every attachment up front so a failure leaves no partial message.
pub fn read_attachments(paths: &[String]) -> AppResult<Vec<Attachment>> {
    paths.iter().map(|path| read_attachment(Path::new(path))).collect()
}

fn read_attachment(path: &Path) -> AppResult<Attachment> {
    let data = fs::read(path).map_err(|source| AppError::AttachmentRead {
        path: path.to_path_buf(),
        source,
    })?;

    let filename = path
        .file_name()
        .map(|value| value.to_string_lossy().to_string())
        .ok_or_else(|| AppError::AttachmentRead {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        })?;

    let mime_type = mime_guess::from_path(path)
        .first()
        .ok_or_else(|| AppError::AttachmentType {
            path: path.to_path_buf(),
        })?
        .essence_str()
        .to_string();

    Ok(Attachment {
        filename,
        mime_type,
        data,
    })
}

fn build_raw_message(mut headers: Vec<String>, body: &str, attachments: &[Attachment]) -> String {
    headers.push("MIME-Version: 1.0".to_string());

    let payload = if attachments.is_empty() {
        headers.push("Content-Type: text/plain; charset=utf-8".to_string());
        format!("{}\r\n\r\n{}", headers.join("\r\n"), body)
    } else {
        let boundary = random_boundary("part");
        headers.push(format!(
            "Content-Type: multipart/mixed; boundary=\"{boundary}\""
        ));
        format!(
            "{}\r\n\r\n{}",
            headers.join("\r\n"),
            multipart_body(body, attachments, &boundary)
        )
    };

    URL_SAFE_NO_PAD.encode(payload.as_bytes())
}

fn build_base_headers(record: &MessageRecord) -> Vec<String> {
    vec![
        format!("From: {}", sanitize_header_value(&record.sender)),
        format!("To: {}", sanitize_header_value(&record.recipient)),
        format!("Subject: {}", encode_header_text(&record.subject)),
    ]
}

fn multipart_body(body: &str, attachments: &[Attachment], boundary: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("--{boundary}\r\n"));
    out.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
    out.push_str(body);
    out.push_str("\r\n");

    for attachment in attachments {
        out.push_str(&format!("--{boundary}\r\n"));
        out.push_str(&format!(
            "Content-Type: {}; name={}\r\n",
            attachment.mime_type,
            quote_header_param(&attachment.filename)
        ));
        out.push_str("Content-Transfer-Encoding: base64\r\n");
        out.push_str(&format!(
            "Content-Disposition: attachment; filename={}\r\n\r\n",
            quote_header_param(&attachment.filename)
        ));

        let encoded = STANDARD.encode(&attachment.data);
        out.push_str(&fold_base64_lines(&encoded));
    }

    out.push_str(&format!("--{boundary}--\r\n"));
    out
}

fn fold_base64_lines(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 76 + 8);
    let mut start = 0;
    while start < input.len() {
        let end = (start + 76).min(input.len());
        out.push_str(&input[start..end]);
        out.push_str("\r\n");
        start = end;
    }
    out
}

/// RFC 2047 `B` encoding for non-ASCII header text, split into encoded words
/// that each stay under the 75 character limit.
fn encode_header_text(value: &str) -> String {
    let value = sanitize_header_value(value);
    if value.is_ascii() {
        return value;
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for ch in value.chars() {
        if chunk.len() + ch.len_utf8() > ENCODED_WORD_CHUNK {
            words.push(format!("=?utf-8?B?{}?=", STANDARD.encode(chunk.as_bytes())));
            chunk.clear();
        }
        chunk.push(ch);
    }
    if !chunk.is_empty() {
        words.push(format!("=?utf-8?B?{}?=", STANDARD.encode(chunk.as_bytes())));
    }

    words.join("\r\n ")
}

pub fn random_boundary(prefix: &str) -> String {
    let mut bytes = [0_u8; 12];
    rand::thread_rng().fill(&mut bytes);
    let token = URL_SAFE_NO_PAD.encode(bytes);
    format!("{prefix}_{token}")
}

fn sanitize_header_value(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|value| *value != '\r' && *value != '\n')
        .collect()
}

/// Renders a parameter value as an RFC 2045 quoted-string.
fn quote_header_param(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in sanitize_header_value(value).chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}
