//! Parsed message model.

mod address;
mod headers;

use std::sync::LazyLock;

use inboxer_imap::Attributes;
use regex::Regex;

pub use address::Address;
pub use headers::Headers;

#[allow(clippy::expect_used)]
static LINKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[a-zA-Z0-9/._-]+").expect("link pattern is valid")
});

/// A fetched message: headers, protocol attributes and body text.
///
/// The accessors are computed from the public fields on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMessage {
    /// Header name (lower-case) to values.
    pub headers: Headers,
    /// UID, flags, dates and size as reported by the server.
    pub attributes: Attributes,
    /// The `TEXT` body section, empty if it was not fetched.
    pub body: String,
}

impl ParsedMessage {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw `To` header values, empty if there are none.
    #[must_use]
    pub fn recipients(&self) -> &[String] {
        self.headers.values("to")
    }

    /// Addresses from every `To` header value.
    #[must_use]
    pub fn recipient_addresses(&self) -> Vec<Address> {
        self.recipients()
            .iter()
            .flat_map(|value| Address::parse_list(value))
            .collect()
    }

    /// First `Subject` header value.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.headers.get("subject")
    }

    /// First `From` header value.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.headers.get("from")
    }

    /// First `Date` header value, unparsed.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.headers.get("date")
    }

    /// The message UID, if it was fetched.
    #[must_use]
    pub const fn uid(&self) -> Option<u32> {
        self.attributes.uid
    }

    /// HTTP(S) links in the body, in order of appearance.
    #[must_use]
    pub fn links(&self) -> Vec<&str> {
        LINKS.find_iter(&self.body).map(|m| m.as_str()).collect()
    }
}
