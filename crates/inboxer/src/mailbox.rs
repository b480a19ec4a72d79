//! The mailbox: one connection to one folder.
//!
//! A [`Mailbox`] creates its client lazily through a [`ClientFactory`],
//! opens [`INBOX`] on connect, and turns fetched raw messages into
//! [`ParsedMessage`]s. Lifecycle changes and watched mail are published as
//! [`MailboxEvent`]s on a broadcast channel.

use std::sync::{Arc, OnceLock};

use futures::StreamExt;
use futures::stream::FuturesOrdered;
use inboxer_imap::{
    AsyncImapFactory, ClientFactory, Config, FetchOptions, Folder, ImapClient, Notification,
    SearchCriteria, UidSet,
};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::adapter::parse_message;
use crate::{Error, FetchRange, MailboxEvent, ParsedMessage, Result};

/// The folder opened by [`Mailbox::connect`].
pub const INBOX: &str = "INBOX";

const EVENT_CAPACITY: usize = 64;

/// A connection to a mailbox's `INBOX`.
pub struct Mailbox<F: ClientFactory = AsyncImapFactory> {
    config: Config,
    factory: F,
    client: OnceLock<Arc<F::Client>>,
    folder: Option<Folder>,
    events: broadcast::Sender<MailboxEvent>,
    watchers: Vec<AbortHandle>,
    forwarder: Option<AbortHandle>,
}

impl Mailbox {
    /// Creates a mailbox using the `async-imap` client.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_factory(config, AsyncImapFactory)
    }
}

impl<F: ClientFactory> Mailbox<F> {
    /// Creates a mailbox whose client is built by `factory`.
    #[must_use]
    pub fn with_factory(config: Config, factory: F) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config,
            factory,
            client: OnceLock::new(),
            folder: None,
            events,
            watchers: Vec::new(),
            forwarder: None,
        }
    }

    /// Connection options.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The client, created on first access.
    pub fn client(&self) -> &Arc<F::Client> {
        self.client.get_or_init(|| {
            debug!(host = %self.config.host, "creating IMAP client");
            Arc::new(self.factory.create(&self.config))
        })
    }

    /// The opened folder, if connected.
    #[must_use]
    pub const fn folder(&self) -> Option<&Folder> {
        self.folder.as_ref()
    }

    /// Subscribes to this mailbox's events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MailboxEvent> {
        self.events.subscribe()
    }

    /// Returns true while a [`watch`](Self::watch) subscription is active.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.watchers.iter().any(|w| !w.is_finished())
    }

    /// Switches the connection options to Gmail (`imap.gmail.com:993`, TLS).
    ///
    /// Has no effect on a client that already exists; call
    /// [`destroy`](Self::destroy) first to apply it.
    pub fn use_gmail(&mut self) -> &mut Self {
        if self.client.get().is_some() {
            warn!("client already created, Gmail settings apply after destroy()");
        }
        self.config.use_gmail();
        self
    }

    /// Connects, authenticates and opens [`INBOX`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if connecting fails, or [`Error::Config`]
    /// if the configured security mode is not supported (either is also
    /// emitted as an event), and [`Error::FolderOpen`] if the folder cannot
    /// be opened.
    pub async fn connect(&mut self, read_only: bool) -> Result<&mut Self> {
        let client = Arc::clone(self.client());
        self.forward_client_errors(&client);

        if let Err(e) = client.connect().await {
            let error = Error::from(e);
            warn!(host = %self.config.host, error = %error, "connect failed");
            self.emit(MailboxEvent::Error(error.clone()));
            return Err(error);
        }

        let folder = client
            .open_box(INBOX, read_only)
            .await
            .map_err(|e| Error::FolderOpen {
                folder: INBOX.to_string(),
                reason: e.to_string(),
            })?;

        info!(folder = %folder.name, exists = folder.exists, read_only, "mailbox connected");
        self.folder = Some(folder.clone());
        self.emit(MailboxEvent::Connected(folder));
        Ok(self)
    }

    /// Ends the connection gracefully and emits [`MailboxEvent::Disconnected`].
    ///
    /// The client is kept and can connect again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the client fails to end the session.
    pub async fn disconnect(&mut self) -> Result<&mut Self> {
        let client = Arc::clone(self.client());
        client.end().await.map_err(Error::from)?;

        self.folder = None;
        info!(host = %self.config.host, "mailbox disconnected");
        self.emit(MailboxEvent::Disconnected);
        Ok(self)
    }

    /// Tears the client down without a logout and stops watching.
    ///
    /// The next access creates a fresh client.
    pub fn destroy(&mut self) -> &mut Self {
        if let Some(client) = self.client.take() {
            client.destroy();
            debug!(host = %self.config.host, "client destroyed");
        }
        self.folder = None;
        self.stop_watching();
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
        self
    }

    /// Fetches new mail as it arrives and emits it as
    /// [`MailboxEvent::Messages`].
    ///
    /// Each notification of `n` new messages fetches the range `1:n` with
    /// `options`. Fetches run independently; a failed one is emitted as
    /// [`MailboxEvent::Error`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn watch(&mut self, options: Option<FetchOptions>) -> &mut Self {
        let client = Arc::clone(self.client());
        let mut notifications = client.notifications();
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            loop {
                match notifications.recv().await {
                    Ok(Notification::Mail(count)) => {
                        debug!(count, "new mail, fetching");
                        tokio::spawn(fetch_new_mail(
                            Arc::clone(&client),
                            count,
                            options.clone(),
                            events.clone(),
                        ));
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "missed new-mail notifications");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        self.watchers.push(task.abort_handle());
        self
    }

    /// Stops every [`watch`](Self::watch) subscription.
    ///
    /// Fetches already started still complete and emit their events.
    pub fn unwatch(&mut self) -> &mut Self {
        self.stop_watching();
        self
    }

    /// Fetches messages by position.
    ///
    /// `5` fetches `1:5`; `(2, 5)` skips two and fetches `3:5`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] if the fetch fails.
    pub async fn fetch(
        &self,
        range: impl Into<FetchRange>,
        options: Option<FetchOptions>,
    ) -> Result<Vec<ParsedMessage>> {
        let range = range.into();
        debug!(range = %range.to_uid_set(), "fetch");
        self.fetch_by_identifier(range.to_uid_set(), options).await
    }

    /// Searches and fetches every match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Search`] or [`Error::Fetch`].
    pub async fn search(
        &self,
        criteria: SearchCriteria,
        options: Option<FetchOptions>,
    ) -> Result<Vec<ParsedMessage>> {
        let ids = self.search_for_identifiers(Some(criteria)).await?;
        if ids.is_empty() {
            debug!("search matched nothing");
            return Ok(Vec::new());
        }
        self.fetch_by_identifier(UidSet::from(ids), options).await
    }

    /// Returns the identifiers matching `criteria`, `ALL` if `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Search`] if the search fails.
    pub async fn search_for_identifiers(
        &self,
        criteria: Option<SearchCriteria>,
    ) -> Result<Vec<u32>> {
        let criteria = criteria.unwrap_or_default();
        self.client()
            .search(&criteria)
            .await
            .map_err(|e| Error::Search(e.to_string()))
    }

    /// Fetches the given messages and parses them, in the order the client
    /// returned them.
    ///
    /// `None` options fetch the `FROM TO SUBJECT DATE` header fields and
    /// the text body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] if the fetch fails at any point.
    pub async fn fetch_by_identifier(
        &self,
        ids: UidSet,
        options: Option<FetchOptions>,
    ) -> Result<Vec<ParsedMessage>> {
        fetch_parsed(self.client().as_ref(), &ids, options).await
    }

    fn emit(&self, event: MailboxEvent) {
        if self.events.send(event).is_err() {
            debug!("no event subscribers");
        }
    }

    fn stop_watching(&mut self) {
        for watcher in self.watchers.drain(..) {
            watcher.abort();
        }
    }

    /// Re-emits errors the client reports on its own as events.
    fn forward_client_errors(&mut self, client: &Arc<F::Client>) {
        if self.forwarder.as_ref().is_some_and(|f| !f.is_finished()) {
            return;
        }

        let mut notifications = client.notifications();
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            loop {
                match notifications.recv().await {
                    Ok(Notification::Error(e)) => {
                        let _ = events.send(MailboxEvent::Error(Error::Client(e.to_string())));
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
            }
        });
        self.forwarder = Some(task.abort_handle());
    }
}

impl<F: ClientFactory> Drop for Mailbox<F> {
    fn drop(&mut self) {
        self.stop_watching();
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }
}

impl<F: ClientFactory> std::fmt::Debug for Mailbox<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailbox")
            .field("config", &self.config)
            .field("connected", &self.client.get().is_some())
            .field("folder", &self.folder)
            .field("watchers", &self.watchers.len())
            .finish_non_exhaustive()
    }
}

async fn fetch_new_mail<C: ImapClient>(
    client: Arc<C>,
    count: u32,
    options: Option<FetchOptions>,
    events: broadcast::Sender<MailboxEvent>,
) {
    let ids = FetchRange::from(count).to_uid_set();
    let event = match fetch_parsed(client.as_ref(), &ids, options).await {
        Ok(messages) => MailboxEvent::Messages(messages),
        Err(e) => {
            warn!(error = %e, "fetching new mail failed");
            MailboxEvent::Error(e)
        }
    };
    let _ = events.send(event);
}

/// One client fetch; each raw message is parsed while the rest stream in.
async fn fetch_parsed<C: ImapClient>(
    client: &C,
    ids: &UidSet,
    options: Option<FetchOptions>,
) -> Result<Vec<ParsedMessage>> {
    let options = options.unwrap_or_default().normalized();
    let mut raw_messages = client
        .fetch(ids, &options)
        .await
        .map_err(|e| Error::Fetch(e.to_string()))?;

    let mut pending = FuturesOrdered::new();
    let mut messages = Vec::new();
    loop {
        tokio::select! {
            item = raw_messages.next() => match item {
                Some(Ok(raw)) => pending.push_back(parse_message(raw)),
                Some(Err(e)) => return Err(Error::Fetch(e.to_string())),
                None => break,
            },
            Some(message) = pending.next(), if !pending.is_empty() => messages.push(message),
        }
    }
    messages.extend(pending.collect::<Vec<_>>().await);

    debug!(%ids, count = messages.len(), "fetched");
    Ok(messages)
}
