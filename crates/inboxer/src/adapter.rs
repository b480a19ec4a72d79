//! Builds a [`ParsedMessage`] from a raw fetched message.

use bytes::BytesMut;
use futures::StreamExt;
use inboxer_imap::{MessageEvent, RawMessage, TEXT_SECTION};
use tracing::trace;

use crate::{Headers, ParsedMessage};

/// Drains a raw message into a [`ParsedMessage`].
///
/// The `TEXT` section (in any case) becomes the body; every other section
/// is parsed as header text and replaces the headers read so far.
/// Attribute events replace the attributes. Completes when
/// the raw message ends, and never if it does not.
pub async fn parse_message(mut raw: RawMessage) -> ParsedMessage {
    let mut message = ParsedMessage::new();

    while let Some(event) = raw.next_event().await {
        match event {
            MessageEvent::Body { info, mut stream } => {
                let mut buffer = BytesMut::with_capacity(info.size);
                while let Some(chunk) = stream.next().await {
                    buffer.extend_from_slice(&chunk);
                }
                let text = String::from_utf8_lossy(&buffer);

                if info.which.trim().eq_ignore_ascii_case(TEXT_SECTION) {
                    message.body = text.into_owned();
                } else {
                    message.headers = Headers::parse(&text);
                }
                trace!(section = %info.which, bytes = buffer.len(), "body section read");
            }
            MessageEvent::Attributes(attributes) => message.attributes = attributes,
        }
    }

    message
}
