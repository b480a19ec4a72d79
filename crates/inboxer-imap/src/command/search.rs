//! SEARCH criteria.

use std::fmt;

use super::check_inline;
use crate::{Error, Result, UidSet};

/// Search criteria for UID SEARCH.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchCriteria {
    /// All messages.
    #[default]
    All,
    /// Messages with \Answered flag.
    Answered,
    /// Messages with \Deleted flag.
    Deleted,
    /// Messages with \Flagged flag.
    Flagged,
    /// Messages with \Recent flag but not \Seen.
    New,
    /// Messages without \Seen flag.
    Unseen,
    /// Messages with \Seen flag.
    Seen,
    /// UID set.
    Uid(UidSet),
    /// Subject contains text.
    Subject(String),
    /// From contains text.
    From(String),
    /// To contains text.
    To(String),
    /// Body contains text.
    Body(String),
    /// Text in header or body.
    Text(String),
    /// Messages since date (`1-Feb-2024`).
    Since(String),
    /// Messages before date.
    Before(String),
    /// Messages on date.
    On(String),
    /// Larger than size.
    Larger(u32),
    /// Smaller than size.
    Smaller(u32),
    /// Header field contains value.
    Header(String, String),
    /// AND of criteria.
    And(Vec<Self>),
    /// OR of criteria.
    Or(Box<Self>, Box<Self>),
    /// NOT of criteria.
    Not(Box<Self>),
    /// Search keys passed through verbatim.
    Raw(String),
}

impl SearchCriteria {
    /// Combines two criteria with OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Negates a criterion.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Checks that every value can be sent inside a single command line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for values containing CR, LF, NUL
    /// or non-ASCII characters, and for dates that are not `d-Mon-yyyy` atoms.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Subject(s) | Self::From(s) | Self::To(s) | Self::Body(s) | Self::Text(s) => {
                check_inline("search value", s)
            }
            Self::Header(name, value) => {
                check_inline("header name", name)?;
                check_inline("header value", value)
            }
            Self::Since(date) | Self::Before(date) | Self::On(date) => check_date(date),
            Self::Raw(raw) => check_inline("search keys", raw),
            Self::And(criteria) => criteria.iter().try_for_each(Self::validate),
            Self::Or(a, b) => {
                a.validate()?;
                b.validate()
            }
            Self::Not(c) => c.validate(),
            Self::All
            | Self::Answered
            | Self::Deleted
            | Self::Flagged
            | Self::New
            | Self::Unseen
            | Self::Seen
            | Self::Uid(_)
            | Self::Larger(_)
            | Self::Smaller(_) => Ok(()),
        }
    }
}

fn check_date(date: &str) -> Result<()> {
    if !date.is_empty() && date.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("search date {date:?}")))
    }
}

impl fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Answered => f.write_str("ANSWERED"),
            Self::Deleted => f.write_str("DELETED"),
            Self::Flagged => f.write_str("FLAGGED"),
            Self::New => f.write_str("NEW"),
            Self::Unseen => f.write_str("UNSEEN"),
            Self::Seen => f.write_str("SEEN"),
            Self::Uid(set) => write!(f, "UID {set}"),
            Self::Subject(s) => write!(f, "SUBJECT {}", Astring(s)),
            Self::From(s) => write!(f, "FROM {}", Astring(s)),
            Self::To(s) => write!(f, "TO {}", Astring(s)),
            Self::Body(s) => write!(f, "BODY {}", Astring(s)),
            Self::Text(s) => write!(f, "TEXT {}", Astring(s)),
            Self::Since(date) => write!(f, "SINCE {date}"),
            Self::Before(date) => write!(f, "BEFORE {date}"),
            Self::On(date) => write!(f, "ON {date}"),
            Self::Larger(size) => write!(f, "LARGER {size}"),
            Self::Smaller(size) => write!(f, "SMALLER {size}"),
            Self::Header(name, value) => write!(f, "HEADER {} {}", Astring(name), Astring(value)),
            Self::And(criteria) if criteria.is_empty() => f.write_str("ALL"),
            Self::And(criteria) => {
                for (i, c) in criteria.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{c}")?;
                }
                Ok(())
            }
            Self::Or(a, b) => write!(f, "OR {} {}", Group(a), Group(b)),
            Self::Not(c) => write!(f, "NOT {}", Group(c)),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

/// An atom, or a quoted string when the text needs it.
struct Astring<'a>(&'a str);

impl fmt::Display for Astring<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        if !s.is_empty() && !s.bytes().any(needs_quoting) {
            return f.write_str(s);
        }
        f.write_str("\"")?;
        for c in s.chars() {
            if c == '"' || c == '\\' {
                f.write_str("\\")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str("\"")
    }
}

/// A criterion wrapped in parentheses when it spans several keys.
struct Group<'a>(&'a SearchCriteria);

impl fmt::Display for Group<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            SearchCriteria::And(criteria) if criteria.len() > 1 => write!(f, "({})", self.0),
            other => write!(f, "{other}"),
        }
    }
}

/// Returns true if the byte needs quoting.
const fn needs_quoting(b: u8) -> bool {
    matches!(b, b' ' | b'"' | b'\\' | b'(' | b')' | b'{' | b'%' | b'*') || b < 0x20 || b == 0x7F
}
