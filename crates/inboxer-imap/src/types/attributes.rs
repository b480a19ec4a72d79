//! Protocol-level message attributes.

use chrono::{DateTime, FixedOffset};

/// Attributes the server reports for a fetched message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    /// Message UID.
    pub uid: Option<u32>,
    /// Message sequence number (0 when unknown).
    pub seq: u32,
    /// Message flags (e.g. `\Seen`, `\Flagged`, keywords).
    pub flags: Vec<String>,
    /// Date the server received the message.
    pub internal_date: Option<DateTime<FixedOffset>>,
    /// Message size in bytes (RFC822.SIZE).
    pub size: Option<u32>,
}

impl Attributes {
    /// Returns true if no attribute has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns true if the message carries the given flag (case-insensitive).
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f.eq_ignore_ascii_case(flag))
    }

    /// Returns true if the message has been read.
    #[must_use]
    pub fn is_seen(&self) -> bool {
        self.has_flag("\\Seen")
    }
}
