use crate::error::AppResult;
use crate::mail::MessageRecord;

const SEPARATOR_WIDTH: usize = 75;

pub fn print_block(block: &str) -> AppResult<()> {
    println!("{block}");
    Ok(())
}

pub fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

pub fn format_record(record: &MessageRecord) -> String {
    let mut lines = vec![
        format!("id: {}", record.id),
        format!("thread: {}", record.thread_id),
        format!("from: {}", or_placeholder(&record.sender, "(unknown sender)")),
        format!("to: {}", or_placeholder(&record.recipient, "(no recipient)")),
        format!("subject: {}", or_placeholder(&record.subject, "(no subject)")),
    ];

    if !record.label_ids.is_empty() {
        let labels = record.label_ids.iter().cloned().collect::<Vec<_>>();
        lines.push(format!("labels: {}", labels.join(", ")));
    }

    if !record.attachments.is_empty() {
        lines.push(format!("attachments: {}", record.attachments.join(", ")));
    }

    lines.push(String::new());
    lines.push(record.body.trim_end().to_string());
    lines.join("\n")
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}
