//! Conversions from `async-imap` response types.

use async_imap::types::{Fetch, Flag, Mailbox};
use bytes::Bytes;
use tracing::debug;

use crate::command::BodySection;
use crate::{Attributes, Folder, MessageEvent, RawMessage, TEXT_SECTION};

pub(crate) fn folder(name: &str, read_only: bool, mailbox: &Mailbox) -> Folder {
    Folder {
        name: name.to_string(),
        read_only,
        exists: mailbox.exists,
        recent: mailbox.recent,
        unseen: mailbox.unseen,
        uid_validity: mailbox.uid_validity,
        uid_next: mailbox.uid_next,
        flags: mailbox.flags.iter().map(flag_name).collect(),
    }
}

/// Wire form of a flag, e.g. `\Seen` or a keyword.
pub(crate) fn flag_name(flag: &Flag<'_>) -> String {
    match flag {
        Flag::Seen => "\\Seen".to_string(),
        Flag::Answered => "\\Answered".to_string(),
        Flag::Flagged => "\\Flagged".to_string(),
        Flag::Deleted => "\\Deleted".to_string(),
        Flag::Draft => "\\Draft".to_string(),
        Flag::Recent => "\\Recent".to_string(),
        Flag::MayCreate => "\\*".to_string(),
        Flag::Custom(name) => name.to_string(),
        #[allow(unreachable_patterns)]
        _ => format!("{flag:?}"),
    }
}

/// Turns one FETCH response into a message with a body event per
/// requested section followed by its attributes. The text section is
/// always reported as `TEXT`, whatever case it was requested in.
pub(crate) fn raw_message(fetch: &Fetch, sections: &[String]) -> RawMessage {
    let mut events = Vec::with_capacity(sections.len() + 1);

    for which in sections {
        let (name, data) = match BodySection::classify(which) {
            BodySection::Full => (which.as_str(), fetch.body()),
            BodySection::Header => (which.as_str(), fetch.header()),
            BodySection::Text => (TEXT_SECTION, fetch.text()),
            BodySection::Other => {
                debug!(section = %which, "body section not supported, skipping");
                continue;
            }
        };
        match data {
            Some(data) => {
                events.push(MessageEvent::body(name, Bytes::copy_from_slice(data)));
            }
            None => debug!(section = %which, uid = ?fetch.uid, "section missing from response"),
        }
    }

    events.push(MessageEvent::Attributes(Attributes {
        uid: fetch.uid,
        seq: fetch.message,
        flags: fetch.flags().map(|flag| flag_name(&flag)).collect(),
        internal_date: fetch.internal_date(),
        size: fetch.size,
    }));

    RawMessage::from_events(events)
}
