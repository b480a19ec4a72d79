//! Integration tests for the mailbox.
//!
//! These tests drive a [`Mailbox`] against a scripted client that records
//! every call, so no server is needed.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::broadcast;

use inboxer::{
    ClientFactory, Config, Credentials, Error, FetchOptions, Folder, ImapClient, Mailbox,
    MailboxEvent, SearchCriteria, Security, UidSet,
};
use inboxer_imap::{
    Attributes, FetchStream, MessageEvent, Notification, RawMessage, Result as ImapResult,
};

/// What the scripted client answers.
#[derive(Default)]
struct Script {
    connect_fails: bool,
    open_fails: bool,
    search_result: Vec<u32>,
    /// `(uid, subject, body)` per message returned by every fetch.
    messages: Vec<(u32, &'static str, &'static str)>,
    /// Fail the fetch stream after this many messages.
    fail_after: Option<usize>,
}

/// Shared between the factory and every client it creates.
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
    options: Mutex<Vec<FetchOptions>>,
    created: AtomicUsize,
}

impl Recorder {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn fetches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("fetch"))
            .collect()
    }
}

struct MockClient {
    script: Arc<Script>,
    recorder: Arc<Recorder>,
    notifications: broadcast::Sender<Notification>,
}

impl MockClient {
    fn notify(&self, notification: Notification) {
        let _ = self.notifications.send(notification);
    }
}

fn raw_message(uid: u32, subject: &str, body: &str) -> RawMessage {
    RawMessage::from_events(vec![
        MessageEvent::body(
            "HEADER.FIELDS (FROM TO SUBJECT DATE)",
            format!("Subject: {subject}\r\nTo: someone@example.com\r\n\r\n"),
        ),
        MessageEvent::body("TEXT", body.to_string()),
        MessageEvent::Attributes(Attributes {
            uid: Some(uid),
            seq: uid,
            ..Attributes::default()
        }),
    ])
}

#[async_trait]
impl ImapClient for MockClient {
    async fn connect(&self) -> ImapResult<()> {
        self.recorder.record("connect");
        if self.script.connect_fails {
            return Err(inboxer_imap::Error::Auth("bad credentials".into()));
        }
        Ok(())
    }

    async fn open_box(&self, name: &str, read_only: bool) -> ImapResult<Folder> {
        self.recorder.record(format!("open {name} {read_only}"));
        if self.script.open_fails {
            return Err(inboxer_imap::Error::Io(std::io::Error::other("no such mailbox")));
        }
        Ok(Folder {
            exists: 3,
            ..Folder::new(name, read_only)
        })
    }

    async fn search(&self, criteria: &SearchCriteria) -> ImapResult<Vec<u32>> {
        self.recorder.record(format!("search {criteria}"));
        Ok(self.script.search_result.clone())
    }

    async fn fetch(&self, uids: &UidSet, options: &FetchOptions) -> ImapResult<FetchStream> {
        self.recorder.record(format!("fetch {uids}"));
        self.recorder.options.lock().unwrap().push(options.clone());

        let mut items: Vec<ImapResult<RawMessage>> = self
            .script
            .messages
            .iter()
            .map(|&(uid, subject, body)| Ok(raw_message(uid, subject, body)))
            .collect();
        if let Some(n) = self.script.fail_after {
            items.truncate(n);
            items.push(Err(inboxer_imap::Error::Io(std::io::Error::other("connection reset"))));
        }
        Ok(stream::iter(items).boxed())
    }

    async fn end(&self) -> ImapResult<()> {
        self.recorder.record("end");
        let _ = self.notifications.send(Notification::Close);
        Ok(())
    }

    fn destroy(&self) {
        self.recorder.record("destroy");
    }

    fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }
}

struct MockFactory {
    script: Arc<Script>,
    recorder: Arc<Recorder>,
}

impl ClientFactory for MockFactory {
    type Client = MockClient;

    fn create(&self, _config: &Config) -> MockClient {
        self.recorder.created.fetch_add(1, Ordering::SeqCst);
        let (notifications, _) = broadcast::channel(16);
        MockClient {
            script: Arc::clone(&self.script),
            recorder: Arc::clone(&self.recorder),
            notifications,
        }
    }
}

fn mailbox(script: Script) -> (Mailbox<MockFactory>, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let factory = MockFactory {
        script: Arc::new(script),
        recorder: Arc::clone(&recorder),
    };
    let config = Config::builder("imap.example.com")
        .credentials(Credentials::new("user", "secret"))
        .build();
    (Mailbox::with_factory(config, factory), recorder)
}

fn three_messages() -> Script {
    Script {
        messages: vec![
            (1, "first", "see https://one.example"),
            (2, "second", "nothing here"),
            (3, "third", "http://three.example/x and https://four.example"),
        ],
        ..Script::default()
    }
}

async fn next_event(events: &mut broadcast::Receiver<MailboxEvent>) -> MailboxEvent {
    tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("event in time")
        .expect("channel open")
}

#[tokio::test]
async fn test_client_is_created_once_and_recreated_after_destroy() {
    let (mut mailbox, recorder) = mailbox(Script::default());
    assert_eq!(recorder.created.load(Ordering::SeqCst), 0);

    mailbox.connect(false).await.unwrap();
    mailbox.connect(false).await.unwrap();
    assert_eq!(recorder.created.load(Ordering::SeqCst), 1);

    mailbox.destroy();
    assert!(mailbox.folder().is_none());
    assert_eq!(recorder.calls().last().map(String::as_str), Some("destroy"));

    mailbox.client();
    assert_eq!(recorder.created.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_connect_opens_inbox_and_emits_connected() {
    let (mut mailbox, recorder) = mailbox(Script::default());
    let mut events = mailbox.subscribe();

    let folder = mailbox.connect(true).await.unwrap().folder().cloned().unwrap();
    assert_eq!(folder.name, "INBOX");
    assert!(folder.read_only);
    assert_eq!(recorder.calls(), ["connect", "open INBOX true"]);

    match next_event(&mut events).await {
        MailboxEvent::Connected(connected) => assert_eq!(connected, folder),
        other => panic!("expected connected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_disconnect_clears_folder_and_emits_once() {
    let (mut mailbox, recorder) = mailbox(Script::default());
    mailbox.connect(true).await.unwrap();
    let mut events = mailbox.subscribe();

    mailbox.disconnect().await.unwrap();
    assert!(mailbox.folder().is_none());
    assert_eq!(recorder.calls().last().map(String::as_str), Some("end"));

    assert!(matches!(next_event(&mut events).await, MailboxEvent::Disconnected));
    assert!(matches!(
        events.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn test_connect_failure_is_returned_and_emitted() {
    let (mut mailbox, recorder) = mailbox(Script {
        connect_fails: true,
        ..Script::default()
    });
    let mut events = mailbox.subscribe();

    let err = mailbox.connect(false).await.unwrap_err();
    assert!(matches!(err, Error::Connection(ref reason) if reason.contains("bad credentials")));
    assert!(mailbox.folder().is_none());
    assert_eq!(recorder.calls(), ["connect"]);

    match next_event(&mut events).await {
        MailboxEvent::Error(emitted) => assert_eq!(emitted, err),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unsupported_security_is_a_config_error() {
    let config = Config::builder("127.0.0.1")
        .security(Security::StartTls)
        .build();
    let mut mailbox = Mailbox::new(config);
    let mut events = mailbox.subscribe();

    let err = mailbox.connect(true).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(matches!(
        next_event(&mut events).await,
        MailboxEvent::Error(Error::Config(_))
    ));
}

#[tokio::test]
async fn test_folder_open_failure() {
    let (mut mailbox, _) = mailbox(Script {
        open_fails: true,
        ..Script::default()
    });

    let err = mailbox.connect(true).await.unwrap_err();
    assert!(matches!(err, Error::FolderOpen { ref folder, .. } if folder == "INBOX"));
    assert!(mailbox.folder().is_none());
}

#[tokio::test]
async fn test_fetch_ranges() {
    let (mailbox, recorder) = mailbox(Script::default());

    mailbox.fetch(5, None).await.unwrap();
    mailbox.fetch((0, 5), None).await.unwrap();
    mailbox.fetch((2, 5), None).await.unwrap();

    assert_eq!(recorder.fetches(), ["fetch 1:5", "fetch 1:5", "fetch 3:5"]);
}

#[tokio::test]
async fn test_fetch_parses_messages_in_client_order() {
    let (mailbox, _) = mailbox(three_messages());

    let messages = mailbox.fetch(3, None).await.unwrap();

    let subjects: Vec<_> = messages.iter().map(|m| m.subject().unwrap()).collect();
    assert_eq!(subjects, ["first", "second", "third"]);
    assert_eq!(messages[0].recipients(), ["someone@example.com"]);
    assert_eq!(messages[1].uid(), Some(2));
    assert!(messages[1].links().is_empty());
    assert_eq!(
        messages[2].links(),
        ["http://three.example/x", "https://four.example"]
    );
}

#[tokio::test]
async fn test_fetch_defaults_options() {
    let (mailbox, recorder) = mailbox(Script::default());

    mailbox.fetch(1, None).await.unwrap();
    mailbox
        .fetch(1, Some(FetchOptions::new().bodies(["TEXT"])))
        .await
        .unwrap();

    let options = recorder.options.lock().unwrap().clone();
    assert_eq!(
        options[0].body_sections(),
        ["HEADER.FIELDS (FROM TO SUBJECT DATE)", "TEXT"]
    );
    assert!(options[0].structure);
    assert_eq!(options[1].body_sections(), ["TEXT"]);
    assert!(options[1].structure);
}

#[tokio::test]
async fn test_fetch_error_fails_the_call() {
    let (mailbox, _) = mailbox(Script {
        fail_after: Some(1),
        ..three_messages()
    });

    let err = mailbox.fetch(3, None).await.unwrap_err();
    assert!(matches!(err, Error::Fetch(ref reason) if reason.contains("connection reset")));
}

#[tokio::test]
async fn test_search_without_hits_skips_fetch() {
    let (mailbox, recorder) = mailbox(three_messages());

    let messages = mailbox.search(SearchCriteria::Unseen, None).await.unwrap();

    assert!(messages.is_empty());
    assert_eq!(recorder.calls(), ["search UNSEEN"]);
}

#[tokio::test]
async fn test_search_fetches_matches() {
    let (mailbox, recorder) = mailbox(Script {
        search_result: vec![3, 7],
        ..three_messages()
    });

    let messages = mailbox
        .search(SearchCriteria::From("alice@example.com".into()), None)
        .await
        .unwrap();

    assert_eq!(messages.len(), 3);
    assert_eq!(
        recorder.calls(),
        ["search FROM alice@example.com", "fetch 3,7"]
    );
}

#[tokio::test]
async fn test_search_for_identifiers_defaults_to_all() {
    let (mailbox, recorder) = mailbox(Script {
        search_result: vec![1, 2],
        ..Script::default()
    });

    let ids = mailbox.search_for_identifiers(None).await.unwrap();

    assert_eq!(ids, [1, 2]);
    assert_eq!(recorder.calls(), ["search ALL"]);
}

#[tokio::test]
async fn test_watch_fetches_new_mail() {
    let (mut mailbox, recorder) = mailbox(three_messages());
    mailbox.connect(true).await.unwrap();
    let mut events = mailbox.subscribe();

    mailbox.watch(None);
    assert!(mailbox.is_watching());
    mailbox.client().notify(Notification::Mail(2));

    match next_event(&mut events).await {
        MailboxEvent::Messages(messages) => assert_eq!(messages.len(), 3),
        other => panic!("expected messages, got {other:?}"),
    }
    assert_eq!(recorder.fetches(), ["fetch 1:2"]);
}

#[tokio::test]
async fn test_watch_handles_each_new_mail_notification() {
    let (mut mailbox, recorder) = mailbox(three_messages());
    mailbox.connect(true).await.unwrap();
    let mut events = mailbox.subscribe();

    mailbox.watch(None);
    mailbox.client().notify(Notification::Mail(1));
    mailbox.client().notify(Notification::Mail(2));

    for _ in 0..2 {
        match next_event(&mut events).await {
            MailboxEvent::Messages(messages) => assert_eq!(messages.len(), 3),
            other => panic!("expected messages, got {other:?}"),
        }
    }
    let mut fetches = recorder.fetches();
    fetches.sort();
    assert_eq!(fetches, ["fetch 1:1", "fetch 1:2"]);
}

#[tokio::test]
async fn test_watch_reports_failed_fetch() {
    let (mut mailbox, _) = mailbox(Script {
        fail_after: Some(0),
        ..Script::default()
    });
    let mut events = mailbox.subscribe();

    mailbox.watch(None);
    mailbox.client().notify(Notification::Mail(1));

    assert!(matches!(
        next_event(&mut events).await,
        MailboxEvent::Error(Error::Fetch(_))
    ));
}

#[tokio::test]
async fn test_unwatch_stops_fetching() {
    let (mut mailbox, recorder) = mailbox(three_messages());
    let mut events = mailbox.subscribe();

    mailbox.watch(None).unwatch();
    assert!(!mailbox.is_watching());
    mailbox.client().notify(Notification::Mail(1));

    let waited = tokio::time::timeout(Duration::from_millis(50), events.recv()).await;
    assert!(waited.is_err());
    assert!(recorder.fetches().is_empty());
}

#[tokio::test]
async fn test_client_errors_become_events() {
    let (mut mailbox, _) = mailbox(Script::default());
    mailbox.connect(true).await.unwrap();
    let mut events = mailbox.subscribe();

    mailbox
        .client()
        .notify(Notification::Error(Arc::new(inboxer_imap::Error::NotConnected)));

    match next_event(&mut events).await {
        MailboxEvent::Error(Error::Client(reason)) => assert_eq!(reason, "Not connected"),
        other => panic!("expected client error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_use_gmail_before_client_creation() {
    let (mut mailbox, recorder) = mailbox(Script::default());

    mailbox.use_gmail();

    assert_eq!(mailbox.config().host, "imap.gmail.com");
    assert_eq!(mailbox.config().port, 993);
    assert_eq!(recorder.created.load(Ordering::SeqCst), 0);
}
