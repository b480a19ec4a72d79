//! Error types for mailbox operations.

use thiserror::Error;

/// Errors that can occur in mailbox operations.
///
/// Cloneable so a failure can be both returned to the caller and emitted
/// as a [`MailboxEvent::Error`](crate::MailboxEvent::Error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Connecting or authenticating failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The folder could not be opened.
    #[error("Failed to open folder {folder}: {reason}")]
    FolderOpen {
        /// Folder name.
        folder: String,
        /// Reason reported by the client.
        reason: String,
    },

    /// A fetch failed.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// A search failed.
    #[error("Search failed: {0}")]
    Search(String),

    /// The client reported an error outside of any pending call.
    #[error("Client error: {0}")]
    Client(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Maps a failure to reach or log in to the server. Settings the client
/// cannot honor become [`Error::Config`], everything else
/// [`Error::Connection`].
impl From<inboxer_imap::Error> for Error {
    fn from(e: inboxer_imap::Error) -> Self {
        match e {
            inboxer_imap::Error::Config(reason) => Self::Config(reason),
            inboxer_imap::Error::UnsupportedSecurity => Self::Config(e.to_string()),
            other => Self::Connection(other.to_string()),
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
