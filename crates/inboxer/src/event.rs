//! Events published by a [`Mailbox`](crate::Mailbox).

use inboxer_imap::Folder;

use crate::{Error, ParsedMessage};

/// Something that happened to a mailbox.
#[derive(Debug, Clone)]
pub enum MailboxEvent {
    /// Connected and opened the folder.
    Connected(Folder),
    /// The connection closed after [`disconnect`](crate::Mailbox::disconnect).
    Disconnected,
    /// New messages fetched while watching.
    Messages(Vec<ParsedMessage>),
    /// A failure, either of a call or reported by the client on its own.
    Error(Error),
}
