//! # inboxer
//!
//! A small mailbox layer over IMAP.
//!
//! [`Mailbox`] connects to a server, opens `INBOX`, and hands back
//! [`ParsedMessage`]s from fetches, searches, and a watch for new mail.
//! The protocol work is done by the client in [`inboxer_imap`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use inboxer::{Config, Credentials, Mailbox, MailboxEvent};
//!
//! #[tokio::main]
//! async fn main() -> inboxer::Result<()> {
//!     let config = Config::gmail(Credentials::new("user@gmail.com", "app-password"));
//!     let mut mailbox = Mailbox::new(config);
//!     let mut events = mailbox.subscribe();
//!
//!     mailbox.connect(true).await?;
//!     for message in mailbox.fetch(10, None).await? {
//!         println!("{:?}: {:?}", message.subject(), message.links());
//!     }
//!
//!     mailbox.watch(None);
//!     while let Ok(event) = events.recv().await {
//!         if let MailboxEvent::Messages(messages) = event {
//!             println!("{} new", messages.len());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod adapter;
mod error;
mod event;
mod mailbox;
pub mod message;
mod range;

pub use adapter::parse_message;
pub use error::{Error, Result};
pub use event::MailboxEvent;
pub use mailbox::{INBOX, Mailbox};
pub use message::{Address, Headers, ParsedMessage};
pub use range::FetchRange;

pub use inboxer_imap::{
    Attributes, ClientFactory, Config, ConfigBuilder, Credentials, FetchOptions, Folder,
    ImapClient, SearchCriteria, Security, UidSet,
};
