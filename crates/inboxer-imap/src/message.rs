//! Raw fetched messages as event streams.
//!
//! A [`RawMessage`] yields one [`MessageEvent::Body`] per requested body
//! section and one [`MessageEvent::Attributes`]. The end of the stream is
//! the end of the message.

use std::fmt;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use futures::Stream;

use crate::Attributes;

/// Section specifier of the message text body.
pub const TEXT_SECTION: &str = "TEXT";

/// Chunks of one body section.
pub type BodyStream = BoxStream<'static, Bytes>;

/// Describes a body section delivered with [`MessageEvent::Body`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyInfo {
    /// The section specifier as requested, e.g. `TEXT`.
    pub which: String,
    /// Total size in bytes.
    pub size: usize,
}

/// One event of a raw message.
pub enum MessageEvent {
    /// A body section, delivered as a chunk stream.
    Body {
        /// Which section this is.
        info: BodyInfo,
        /// The section data.
        stream: BodyStream,
    },
    /// Message attributes (UID, flags, dates, ...).
    Attributes(Attributes),
}

impl MessageEvent {
    /// Creates a body event carrying the whole section in one chunk.
    #[must_use]
    pub fn body(which: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self::Body {
            info: BodyInfo {
                which: which.into(),
                size: data.len(),
            },
            stream: stream::iter([data]).boxed(),
        }
    }
}

impl fmt::Debug for MessageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body { info, .. } => f.debug_struct("Body").field("info", info).finish(),
            Self::Attributes(attrs) => f.debug_tuple("Attributes").field(attrs).finish(),
        }
    }
}

/// A message as streamed back by a fetch.
pub struct RawMessage {
    events: BoxStream<'static, MessageEvent>,
}

impl RawMessage {
    /// Wraps an event stream.
    pub fn new(events: impl Stream<Item = MessageEvent> + Send + 'static) -> Self {
        Self {
            events: events.boxed(),
        }
    }

    /// Creates a message from events that are all available up front.
    #[must_use]
    pub fn from_events(events: Vec<MessageEvent>) -> Self {
        Self::new(stream::iter(events))
    }

    /// Waits for the next event; `None` marks the end of the message.
    pub async fn next_event(&mut self) -> Option<MessageEvent> {
        self.events.next().await
    }
}

impl fmt::Debug for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawMessage").finish_non_exhaustive()
    }
}
