//! Request types for search and fetch.

mod fetch;
mod search;

pub use fetch::{DEFAULT_BODIES, FetchOptions};
pub(crate) use fetch::BodySection;
pub use search::SearchCriteria;

use crate::{Error, Result};

/// Rejects text that would break out of its command line: CR, LF, NUL, or
/// bytes outside 7-bit ASCII.
pub(crate) fn check_inline(what: &str, text: &str) -> Result<()> {
    if text.bytes().all(|b| b.is_ascii() && !matches!(b, b'\r' | b'\n' | 0)) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "{what} {text:?} contains CR, LF, NUL or non-ASCII characters"
        )))
    }
}
