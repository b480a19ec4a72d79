#![allow(clippy::expect_used, clippy::doc_markdown)]
//! Example: print the latest messages, then watch INBOX for new mail
//!
//! ## Configuration
//!
//! A JSON file with the connection options:
//!
//! ```json
//! {
//!   "host": "imap.gmail.com",
//!   "port": 993,
//!   "security": "implicit",
//!   "username": "you@gmail.com",
//!   "password": "app-password",
//!   "poll_interval_secs": 15
//! }
//! ```
//!
//! ## Running
//!
//! ```bash
//! cargo run --package inboxer --example watch_inbox -- inbox.json
//! ```

use anyhow::Context;
use inboxer::{Config, Mailbox, MailboxEvent, ParsedMessage};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_message(message: &ParsedMessage) {
    println!(
        "#{} {} | {}",
        message.uid().unwrap_or_default(),
        message.from().unwrap_or("(unknown sender)"),
        message.subject().unwrap_or("(no subject)")
    );
    for link in message.links() {
        println!("    {link}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inboxer=debug,inboxer_imap=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: watch_inbox <config.json>")?;
    let config = Config::from_json_file(&path)?;

    let mut mailbox = Mailbox::new(config);
    let mut events = mailbox.subscribe();

    let folder = mailbox
        .connect(true)
        .await?
        .folder()
        .cloned()
        .expect("folder is set after connect");
    println!("{} holds {} messages", folder.name, folder.exists);

    let offset = folder.exists.saturating_sub(10);
    for message in mailbox.fetch((offset, folder.exists), None).await? {
        print_message(&message);
    }

    mailbox.watch(None);
    println!("Watching for new mail, Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(MailboxEvent::Messages(messages)) => messages.iter().for_each(print_message),
                Ok(MailboxEvent::Error(e)) => eprintln!("error: {e}"),
                Ok(_) => {}
                Err(_) => break,
            },
        }
    }

    mailbox.unwatch().disconnect().await?;
    Ok(())
}
