//! UID sets for fetch requests.

use std::fmt;

/// A set of message UIDs, rendered in IMAP sequence-set syntax.
///
/// Values are passed through as given: a range is not reordered or
/// validated, the server decides what it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UidSet {
    /// Single UID.
    Single(u32),
    /// Range of UIDs (inclusive).
    Range(u32, u32),
    /// Explicit list of UIDs.
    List(Vec<u32>),
}

impl UidSet {
    /// Creates a UID set from a single UID.
    #[must_use]
    pub const fn single(uid: u32) -> Self {
        Self::Single(uid)
    }

    /// Creates a UID set from an inclusive range.
    #[must_use]
    pub const fn range(start: u32, end: u32) -> Self {
        Self::Range(start, end)
    }

    /// Returns true if the set names no message at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::List(ids) if ids.is_empty())
    }
}

impl From<Vec<u32>> for UidSet {
    fn from(ids: Vec<u32>) -> Self {
        Self::List(ids)
    }
}

impl From<&[u32]> for UidSet {
    fn from(ids: &[u32]) -> Self {
        Self::List(ids.to_vec())
    }
}

impl fmt::Display for UidSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(n) => write!(f, "{n}"),
            Self::Range(start, end) => write!(f, "{start}:{end}"),
            Self::List(ids) => {
                let s: Vec<_> = ids.iter().map(ToString::to_string).collect();
                write!(f, "{}", s.join(","))
            }
        }
    }
}
