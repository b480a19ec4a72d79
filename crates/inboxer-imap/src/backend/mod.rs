//! [`ImapClient`] implementation backed by `async-imap`.
//!
//! One authenticated session is kept behind a `tokio::sync::Mutex`; every
//! command locks it for its duration, which queues concurrent callers.
//! After a folder is opened a poller task issues NOOP every
//! [`Config::poll_interval`] and turns EXISTS growth into
//! [`Notification::Mail`].

mod convert;
mod poller;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::{Mutex, MutexGuard, broadcast, mpsc, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::client::{ClientFactory, FetchStream, ImapClient, Notification};
use crate::{Config, Error, FetchOptions, Folder, ImapStream, Result, SearchCriteria, UidSet};

use poller::ExistsTracker;

/// Session type driven by this backend.
pub type ImapSession = async_imap::Session<ImapStream>;

const NOTIFICATION_CAPACITY: usize = 64;

/// Connection state guarded by the command lock.
#[derive(Default)]
struct State {
    session: Option<ImapSession>,
    tracker: ExistsTracker,
    poller: Option<AbortHandle>,
}

impl State {
    fn stop_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

/// Locks the state, dropping the session if the client was destroyed meanwhile.
async fn lock_state<'a>(
    state: &'a Mutex<State>,
    destroyed: &watch::Receiver<bool>,
) -> Result<MutexGuard<'a, State>> {
    let mut guard = state.lock().await;
    if *destroyed.borrow() {
        guard.stop_poller();
        guard.session = None;
        return Err(Error::NotConnected);
    }
    Ok(guard)
}

/// IMAP client over a single `async-imap` session.
pub struct AsyncImapClient {
    config: Config,
    state: Arc<Mutex<State>>,
    notifications: broadcast::Sender<Notification>,
    destroyed: watch::Sender<bool>,
}

impl AsyncImapClient {
    /// Creates an unconnected client.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        let (destroyed, _) = watch::channel(false);
        Self {
            config,
            state: Arc::new(Mutex::new(State::default())),
            notifications,
            destroyed,
        }
    }

    /// Returns the configuration this client connects with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    async fn lock(&self) -> Result<MutexGuard<'_, State>> {
        lock_state(&self.state, &self.destroyed.subscribe()).await
    }

    fn spawn_poller(&self) -> Option<AbortHandle> {
        let interval = self.config.poll_interval;
        if interval.is_zero() {
            debug!("new-mail polling disabled");
            return None;
        }
        let task = tokio::spawn(poller::poll_for_mail(
            Arc::clone(&self.state),
            self.notifications.clone(),
            self.destroyed.subscribe(),
            interval,
        ));
        Some(task.abort_handle())
    }
}

impl std::fmt::Debug for AsyncImapClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncImapClient")
            .field("config", &self.config)
            .field("destroyed", &*self.destroyed.borrow())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ImapClient for AsyncImapClient {
    async fn connect(&self) -> Result<()> {
        if *self.destroyed.borrow() {
            return Err(Error::NotConnected);
        }

        let config = &self.config;
        info!(host = %config.host, port = config.port, "connecting to IMAP server");

        let stream = ImapStream::open(config).await?;
        let client = async_imap::Client::new(stream);
        let session = client
            .login(&config.credentials.username, &config.credentials.password)
            .await
            .map_err(|(e, _client)| Error::Auth(e.to_string()))?;

        let mut state = self.lock().await?;
        state.stop_poller();
        if state.session.replace(session).is_some() {
            debug!("replaced previous session");
        }
        state.tracker = ExistsTracker::default();

        info!(host = %config.host, "IMAP session ready");
        Ok(())
    }

    async fn open_box(&self, name: &str, read_only: bool) -> Result<Folder> {
        let mut guard = self.lock().await?;
        let state = &mut *guard;
        let session = state.session.as_mut().ok_or(Error::NotConnected)?;

        let mailbox = if read_only {
            session.examine(name).await?
        } else {
            session.select(name).await?
        };
        // Responses queued before the switch belong to the previous folder.
        while session.unsolicited_responses.try_recv().is_ok() {}

        state.tracker = ExistsTracker::new(mailbox.exists);
        state.stop_poller();
        state.poller = self.spawn_poller();

        let folder = convert::folder(name, read_only, &mailbox);
        debug!(folder = %folder.name, exists = folder.exists, read_only, "folder opened");
        Ok(folder)
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<u32>> {
        criteria.validate()?;
        let mut state = self.lock().await?;
        let session = state.session.as_mut().ok_or(Error::NotConnected)?;

        let query = criteria.to_string();
        debug!(%query, "UID SEARCH");
        let mut uids: Vec<u32> = session.uid_search(&query).await?.into_iter().collect();
        uids.sort_unstable();
        Ok(uids)
    }

    async fn fetch(&self, uids: &UidSet, options: &FetchOptions) -> Result<FetchStream> {
        options.validate()?;
        let set = uids.to_string();
        let query = options.to_query();
        let sections = options.body_sections().to_vec();
        debug!(%set, %query, "UID FETCH");

        let state = Arc::clone(&self.state);
        let destroyed = self.destroyed.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut guard = match lock_state(&state, &destroyed).await {
                Ok(guard) => guard,
                Err(e) => {
                    let _ = tx.send(Err(e));
                    return;
                }
            };
            let Some(session) = guard.session.as_mut() else {
                let _ = tx.send(Err(Error::NotConnected));
                return;
            };

            let fetches = match session.uid_fetch(&set, &query).await {
                Ok(fetches) => fetches,
                Err(e) => {
                    let _ = tx.send(Err(e.into()));
                    return;
                }
            };
            let mut fetches = std::pin::pin!(fetches);

            // The response is drained in full even if the receiver is gone,
            // so the session stays in sync for the next command.
            while let Some(item) = fetches.next().await {
                let item = item
                    .map(|fetch| convert::raw_message(&fetch, &sections))
                    .map_err(Error::from);
                let _ = tx.send(item);
            }
        });

        Ok(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed())
    }

    async fn end(&self) -> Result<()> {
        let session = {
            let mut state = self.state.lock().await;
            state.stop_poller();
            state.session.take()
        };

        if let Some(mut session) = session {
            if let Err(e) = session.logout().await {
                warn!(error = %e, "logout failed, dropping connection");
            }
        }

        let _ = self.notifications.send(Notification::Close);
        info!(host = %self.config.host, "IMAP connection closed");
        Ok(())
    }

    fn destroy(&self) {
        self.destroyed.send_replace(true);
        if let Ok(mut state) = self.state.try_lock() {
            state.stop_poller();
            state.session = None;
        }
        let _ = self.notifications.send(Notification::Close);
        debug!(host = %self.config.host, "IMAP client destroyed");
    }

    fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }
}

impl Drop for AsyncImapClient {
    fn drop(&mut self) {
        // Stops the poller, which otherwise keeps the session alive.
        self.destroyed.send_replace(true);
    }
}

/// Factory producing [`AsyncImapClient`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsyncImapFactory;

impl ClientFactory for AsyncImapFactory {
    type Client = AsyncImapClient;

    fn create(&self, config: &Config) -> Self::Client {
        AsyncImapClient::new(config.clone())
    }
}
