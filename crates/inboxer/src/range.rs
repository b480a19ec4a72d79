//! Offset/limit normalisation for [`Mailbox::fetch`](crate::Mailbox::fetch).

use inboxer_imap::UidSet;

/// Messages to fetch, as an offset and a limit.
///
/// A bare number is a limit with offset zero; a pair is `(offset, limit)`.
/// The resulting set is the 1-based inclusive range `offset + 1 .. limit`,
/// passed to the server as is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchRange {
    /// Number of leading messages to skip.
    pub offset: u32,
    /// Last message to fetch.
    pub limit: u32,
}

impl FetchRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }

    /// The identifier set this range selects.
    #[must_use]
    pub const fn to_uid_set(self) -> UidSet {
        UidSet::Range(self.offset.saturating_add(1), self.limit)
    }
}

impl From<u32> for FetchRange {
    fn from(limit: u32) -> Self {
        Self::new(0, limit)
    }
}

impl From<(u32, u32)> for FetchRange {
    fn from((offset, limit): (u32, u32)) -> Self {
        Self::new(offset, limit)
    }
}

impl From<FetchRange> for UidSet {
    fn from(range: FetchRange) -> Self {
        range.to_uid_set()
    }
}
