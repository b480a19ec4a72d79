//! The client surface consumed by the mailbox layer.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio::sync::broadcast;

use crate::{Config, Error, FetchOptions, Folder, RawMessage, Result, SearchCriteria, UidSet};

/// Messages streamed back by [`ImapClient::fetch`].
///
/// An `Err` item is the fetch failing; the end of the stream is the fetch
/// completing.
pub type FetchStream = BoxStream<'static, Result<RawMessage>>;

/// Something the client reports outside of any pending call.
#[derive(Debug, Clone)]
pub enum Notification {
    /// This many new messages arrived in the opened folder.
    Mail(u32),
    /// A connection-level error occurred.
    Error(Arc<Error>),
    /// The connection closed.
    Close,
}

/// An IMAP client connection.
///
/// All methods take `&self`; implementations queue concurrent commands on
/// their single connection.
#[async_trait]
pub trait ImapClient: Send + Sync + 'static {
    /// Opens the connection and authenticates. Returning `Ok` means ready.
    async fn connect(&self) -> Result<()>;

    /// Opens a folder, read-only if requested.
    async fn open_box(&self, name: &str, read_only: bool) -> Result<Folder>;

    /// Returns the UIDs of the messages matching `criteria`.
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<u32>>;

    /// Starts fetching the given messages.
    async fn fetch(&self, uids: &UidSet, options: &FetchOptions) -> Result<FetchStream>;

    /// Ends the connection gracefully; returns once it is closed.
    async fn end(&self) -> Result<()>;

    /// Tears the connection down immediately.
    fn destroy(&self);

    /// Subscribes to the client's notifications.
    fn notifications(&self) -> broadcast::Receiver<Notification>;
}

/// Builds clients from connection options.
pub trait ClientFactory: Send + Sync {
    /// The client type produced.
    type Client: ImapClient;

    /// Creates a new, unconnected client.
    fn create(&self, config: &Config) -> Self::Client;
}
