pub const UNREAD_LABEL: &str = "UNREAD";

pub fn message_endpoint(id: &str) -> String {
    format!("/gmail/v1/users/me/messages/{id}")
}

pub fn list_endpoint() -> &'static str {
    "/gmail/v1/users/me/messages"
}

pub fn send_endpoint() -> &'static str {
    "/gmail/v1/users/me/messages/send"
}

pub fn batch_endpoint() -> &'static str {
    "/batch/gmail/v1"
}

pub fn get_query() -> Vec<(String, String)> {
    vec![("format".to_string(), "raw".to_string())]
}

/// Request line target for a `format=raw` get inside a batch part.
pub fn raw_get_target(id: &str) -> String {
    format!("{}?format=raw", message_endpoint(id))
}

pub fn list_query(label_id: &str, page_size: u32, page_token: Option<&str>) -> Vec<(String, String)> {
    let mut params = vec![
        ("labelIds".to_string(), label_id.to_string()),
        ("maxResults".to_string(), page_size.to_string()),
    ];
    if let Some(token) = page_token {
        params.push(("pageToken".to_string(), token.to_string()));
    }
    params
}
