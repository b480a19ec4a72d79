//! # inboxer-imap
//!
//! The IMAP client seam used by `inboxer`.
//!
//! The wire protocol itself is handled by [`async_imap`]. This crate only
//! describes what the mailbox layer needs from a client and provides one
//! implementation of it:
//!
//! - [`ImapClient`]: connect, open a folder, search, fetch, end, destroy,
//!   and a broadcast channel of [`Notification`]s (new mail, errors, close)
//! - [`ClientFactory`]: builds a client from a [`Config`] on demand
//! - [`AsyncImapClient`]: the `async-imap` backed client over a rustls stream
//! - [`FetchOptions`], [`SearchCriteria`], [`UidSet`]: request types
//! - [`RawMessage`]: a fetched message as a stream of body/attribute events
//!
//! ## Quick Start
//!
//! ```ignore
//! use inboxer_imap::{AsyncImapClient, Config, Credentials, FetchOptions, ImapClient, UidSet};
//!
//! #[tokio::main]
//! async fn main() -> inboxer_imap::Result<()> {
//!     let config = Config::builder("imap.example.com")
//!         .credentials(Credentials::new("user@example.com", "password"))
//!         .build();
//!
//!     let client = AsyncImapClient::new(config);
//!     client.connect().await?;
//!
//!     let folder = client.open_box("INBOX", true).await?;
//!     println!("{} messages", folder.exists);
//!
//!     let mut fetch = client
//!         .fetch(&UidSet::range(1, 10), &FetchOptions::default().normalized())
//!         .await?;
//!
//!     client.end().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod backend;
mod client;
pub mod command;
mod config;
mod error;
mod message;
mod stream;
pub mod types;

pub use backend::{AsyncImapClient, AsyncImapFactory};
pub use client::{ClientFactory, FetchStream, ImapClient, Notification};
pub use command::{FetchOptions, SearchCriteria};
pub use config::{Config, ConfigBuilder, Credentials, Security};
pub use error::{Error, Result};
pub use message::{BodyInfo, BodyStream, MessageEvent, RawMessage, TEXT_SECTION};
pub use stream::{ImapStream, connect_plain, connect_tls, tls_connector};
pub use types::{Attributes, Folder, UidSet};
