mod common;

use common::{FakeMailbox, raw_email};
use gmail_unread::error::AppError;
use gmail_unread::fetcher::{FetchMode, FetchOptions, Fetcher};

fn options(page_size: u32, batch_size: usize) -> FetchOptions {
    FetchOptions {
        page_size,
        batch_size,
    }
}

#[tokio::test]
async fn lists_every_unread_id_across_pages() {
    let mut mailbox = FakeMailbox::new();
    for index in 0..250 {
        mailbox.insert_unread(&format!("u{index:03}"));
    }
    for index in 0..7 {
        let raw = raw_email("read", "a@x", "b@x", "seen");
        mailbox.insert(&format!("r{index}"), &["INBOX"], raw);
    }

    let fetcher = Fetcher::with_options(mailbox, options(100, 50));
    let ids = fetcher.list_unread_ids().await.expect("list");

    assert_eq!(ids.len(), 250);
    assert!(ids.iter().all(|id| id.starts_with('u')));

    let calls = fetcher.api().list_calls.lock().expect("lock").clone();
    assert_eq!(calls, [None, Some("100".to_string()), Some("200".to_string())]);
}

#[tokio::test]
async fn pager_requests_pages_lazily() {
    let mut mailbox = FakeMailbox::new();
    for index in 0..5 {
        mailbox.insert_unread(&format!("u{index}"));
    }

    let fetcher = Fetcher::with_options(mailbox, options(2, 50));
    let mut pager = fetcher.unread_ids();

    assert_eq!(pager.next().await.expect("next").as_deref(), Some("u0"));
    assert_eq!(pager.next().await.expect("next").as_deref(), Some("u1"));
    assert_eq!(fetcher.api().list_calls.lock().expect("lock").len(), 1);

    assert_eq!(pager.next().await.expect("next").as_deref(), Some("u2"));
    assert_eq!(fetcher.api().list_calls.lock().expect("lock").len(), 2);
}

#[tokio::test]
async fn empty_mailbox_lists_nothing() {
    let fetcher = Fetcher::new(FakeMailbox::new());

    assert!(fetcher.list_unread_ids().await.expect("list").is_empty());
    assert_eq!(fetcher.api().list_calls.lock().expect("lock").len(), 1);
}

#[tokio::test]
async fn fetch_raw_reports_vanished_message() {
    let mut mailbox = FakeMailbox::new();
    mailbox.insert_unread("gone");
    mailbox.gone.insert("gone".to_string());

    let fetcher = Fetcher::new(mailbox);
    match fetcher.fetch_raw("gone").await {
        Err(AppError::NotFound { id }) => assert_eq!(id, "gone"),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn batch_fetch_keys_results_by_id_and_keeps_failures() {
    let mut mailbox = FakeMailbox::new();
    for id in ["a", "b", "c", "d", "e"] {
        mailbox.insert_unread(id);
    }
    mailbox.gone.insert("c".to_string());

    let fetcher = Fetcher::with_options(mailbox, options(100, 2));
    let ids = ["a", "b", "c", "d", "e"].map(String::from).to_vec();
    let outcome = fetcher.fetch_raw_batch(&ids).await.expect("batch");

    assert_eq!(outcome.success_count(), 4);
    assert_eq!(outcome.failure_count(), 1);
    assert!(matches!(outcome.get("c"), Some(Err(AppError::NotFound { .. }))));
    for id in ["a", "b", "d", "e"] {
        let message = outcome.get(id).expect("entry").as_ref().expect("fetched");
        assert_eq!(message.id, id);
    }

    let chunks = fetcher.api().batch_calls.lock().expect("lock").clone();
    assert_eq!(chunks.len(), 3);
    assert!(chunks.iter().all(|chunk| chunk.len() <= 2));
}

#[tokio::test]
async fn batch_results_follow_listing_order() {
    let mut mailbox = FakeMailbox::new();
    for id in ["a", "b", "c"] {
        mailbox.insert_unread(id);
    }

    let fetcher = Fetcher::new(mailbox);
    let ids = fetcher.list_unread_ids().await.expect("list");
    let (messages, failures) = fetcher
        .fetch_raw_batch(&ids)
        .await
        .expect("batch")
        .into_ordered(&ids);

    assert!(failures.is_empty());
    let fetched = messages.iter().map(|message| message.id.as_str()).collect::<Vec<_>>();
    assert_eq!(fetched, ["a", "b", "c"]);
}

async fn unread_report_with(mode: FetchMode) {
    let mut mailbox = FakeMailbox::new();
    mailbox.insert_unread("ok-1");
    mailbox.insert_unread("ok-2");
    mailbox.insert_unread("vanished");
    mailbox.gone.insert("vanished".to_string());
    mailbox.insert("broken", &["UNREAD"], "%%% not base64 %%%".to_string());

    let fetcher = Fetcher::new(mailbox);
    let report = fetcher.unread_messages(mode).await.expect("report");

    let subjects = report
        .messages
        .iter()
        .map(|record| record.subject.as_str())
        .collect::<Vec<_>>();
    assert_eq!(subjects, ["ok-1", "ok-2"]);
    assert!(report.messages.iter().all(|record| record.has_label("UNREAD")));

    assert_eq!(report.failures.len(), 2);
    assert!(report.failures.iter().any(|failure| {
        failure.id == "vanished" && matches!(failure.error, AppError::NotFound { .. })
    }));
    assert!(report.failures.iter().any(|failure| {
        failure.id == "broken" && matches!(failure.error, AppError::MalformedMessage { .. })
    }));
}

#[tokio::test]
async fn unread_messages_batched_reports_failures() {
    unread_report_with(FetchMode::Batched).await;
}

#[tokio::test]
async fn unread_messages_sequential_reports_failures() {
    unread_report_with(FetchMode::Sequential).await;
}

#[tokio::test]
async fn sequential_mode_never_batches() {
    let mut mailbox = FakeMailbox::new();
    mailbox.insert_unread("a");

    let fetcher = Fetcher::new(mailbox);
    fetcher
        .unread_messages(FetchMode::Sequential)
        .await
        .expect("report");

    assert!(fetcher.api().batch_calls.lock().expect("lock").is_empty());
    assert_eq!(*fetcher.api().get_calls.lock().expect("lock"), ["a"]);
}

fn mailbox_with(ids: &[&str]) -> FakeMailbox {
    let mut mailbox = FakeMailbox::new();
    for id in ids {
        mailbox.insert_unread(id);
    }
    mailbox
}

fn id_list(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
async fn failed_chunk_keeps_results_of_other_chunks() {
    let mut mailbox = mailbox_with(&["a", "b", "c", "d"]);
    mailbox.failing_batches.insert(1);

    let fetcher = Fetcher::with_options(mailbox, options(100, 2));
    let outcome = fetcher
        .fetch_raw_batch(&id_list(&["a", "b", "c", "d"]))
        .await
        .expect("batch");

    assert_eq!(outcome.success_count(), 2);
    assert_eq!(outcome.failure_count(), 2);
    for id in ["a", "b"] {
        let message = outcome.get(id).expect("entry").as_ref().expect("fetched");
        assert_eq!(message.id, id);
    }
    for id in ["c", "d"] {
        match outcome.get(id) {
            Some(Err(AppError::BatchTransport(reason))) => assert_eq!(reason, "connection reset"),
            other => panic!("expected transport failure for {id}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn batch_fails_when_no_exchange_completes() {
    let mut mailbox = mailbox_with(&["a", "b", "c"]);
    mailbox.failing_batches.extend([0, 1]);

    let fetcher = Fetcher::with_options(mailbox, options(100, 2));
    let result = fetcher.fetch_raw_batch(&id_list(&["a", "b", "c"])).await;

    assert!(matches!(result, Err(AppError::BatchTransport(_))));
    assert_eq!(fetcher.api().batch_calls.lock().expect("lock").len(), 2);
}

#[tokio::test]
async fn unread_messages_propagates_batch_transport_failure() {
    let mut mailbox = mailbox_with(&["a", "b"]);
    mailbox.failing_batches.insert(0);

    let fetcher = Fetcher::new(mailbox);
    let result = fetcher.unread_messages(FetchMode::Batched).await;

    assert!(matches!(result, Err(AppError::BatchTransport(_))));
}

#[tokio::test]
async fn unread_messages_reports_failed_chunk_ids() {
    let mut mailbox = mailbox_with(&["a", "b", "c"]);
    mailbox.failing_batches.insert(1);

    let fetcher = Fetcher::with_options(mailbox, options(100, 2));
    let report = fetcher
        .unread_messages(FetchMode::Batched)
        .await
        .expect("report");

    let fetched = report
        .messages
        .iter()
        .map(|record| record.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(fetched, ["a", "b"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id, "c");
    assert!(matches!(report.failures[0].error, AppError::BatchTransport(_)));
}

async fn auth_failure_aborts_with(mode: FetchMode) {
    let mut mailbox = mailbox_with(&["a", "b"]);
    mailbox.unauthorized.insert("b".to_string());

    let fetcher = Fetcher::new(mailbox);
    let result = fetcher.unread_messages(mode).await;

    assert!(matches!(result, Err(AppError::Auth(_))), "mode {mode:?}");
}

#[tokio::test]
async fn auth_failure_aborts_batched_run() {
    auth_failure_aborts_with(FetchMode::Batched).await;
}

#[tokio::test]
async fn auth_failure_aborts_sequential_run() {
    auth_failure_aborts_with(FetchMode::Sequential).await;
}
