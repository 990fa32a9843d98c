use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use mailparse::{DispositionType, MailHeaderMap, ParsedMail};

use crate::api::models::RawMessage;
use crate::error::{AppError, AppResult};

use super::record::MessageRecord;

/// Gmail hands out url-safe base64, sometimes padded and sometimes not.
const RAW_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Converts a raw provider message into a [`MessageRecord`].
///
/// Missing headers and a missing `text/plain` part yield empty fields. A
/// payload that cannot be decoded or parsed is a `MalformedMessage` error.
pub fn simplify(message: &RawMessage) -> AppResult<MessageRecord> {
    let bytes = decode_raw(&message.id, &message.raw)?;
    let parsed =
        mailparse::parse_mail(&bytes).map_err(|err| AppError::malformed(&message.id, err))?;
    let headers = parsed.get_headers();

    let body = match find_plain_text(&parsed) {
        Some(part) => part
            .get_body()
            .map_err(|err| AppError::malformed(&message.id, err))?,
        None => String::new(),
    };

    let mut attachments = Vec::new();
    collect_attachment_names(&parsed, &mut attachments);

    Ok(MessageRecord {
        id: message.id.clone(),
        thread_id: message.thread_id.clone(),
        message_id: header_or_empty(&headers, "Message-ID"),
        label_ids: message.label_ids.iter().cloned().collect(),
        sender: header_or_empty(&headers, "From"),
        recipient: header_or_empty(&headers, "To"),
        subject: header_or_empty(&headers, "Subject"),
        body,
        attachments,
    })
}

pub fn decode_raw(id: &str, raw: &str) -> AppResult<Vec<u8>> {
    RAW_ENGINE
        .decode(raw.trim())
        .map_err(|err| AppError::malformed(id, format!("raw payload is not base64url: {err}")))
}

fn header_or_empty<M: MailHeaderMap + ?Sized>(headers: &M, name: &str) -> String {
    headers
        .get_first_value(name)
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn is_attachment(part: &ParsedMail<'_>) -> bool {
    matches!(
        part.get_content_disposition().disposition,
        DispositionType::Attachment
    )
}

fn find_plain_text<'a, 'b>(part: &'a ParsedMail<'b>) -> Option<&'a ParsedMail<'b>> {
    if is_attachment(part) {
        return None;
    }

    if part.subparts.is_empty() {
        return part
            .ctype
            .mimetype
            .eq_ignore_ascii_case("text/plain")
            .then_some(part);
    }

    part.subparts.iter().find_map(find_plain_text)
}

/// Attachment parts that carry neither `filename` nor `name` are left out.
fn collect_attachment_names(part: &ParsedMail<'_>, out: &mut Vec<String>) {
    if is_attachment(part) {
        let disposition = part.get_content_disposition();
        let name = disposition
            .params
            .get("filename")
            .or_else(|| part.ctype.params.get("name"))
            .map(|name| name.trim())
            .filter(|name| !name.is_empty());
        if let Some(name) = name {
            out.push(name.to_string());
        }
        return;
    }

    for subpart in &part.subparts {
        collect_attachment_names(subpart, out);
    }
}
