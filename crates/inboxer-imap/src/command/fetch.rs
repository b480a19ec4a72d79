//! Fetch options and query rendering.

use super::check_inline;
use crate::message::TEXT_SECTION;
use crate::{Error, Result};

/// Body sections fetched when the caller does not name any.
pub const DEFAULT_BODIES: [&str; 2] = ["HEADER.FIELDS (FROM TO SUBJECT DATE)", TEXT_SECTION];

/// What to fetch for each message.
///
/// `bodies` distinguishes "not given" (`None`, replaced by
/// [`DEFAULT_BODIES`] on [`normalized`](Self::normalized)) from an explicit
/// empty list, which fetches attributes only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Body section specifiers, e.g. `TEXT` or `HEADER.FIELDS (SUBJECT)`.
    pub bodies: Option<Vec<String>>,
    /// Use `BODY[...]` instead of `BODY.PEEK[...]`, setting `\Seen`.
    pub mark_seen: bool,
    /// Request the body structure.
    pub structure: bool,
}

impl FetchOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the body sections to fetch.
    #[must_use]
    pub fn bodies<I, S>(mut self, bodies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bodies = Some(bodies.into_iter().map(Into::into).collect());
        self
    }

    /// Sets whether fetching marks messages as seen.
    #[must_use]
    pub const fn mark_seen(mut self, mark_seen: bool) -> Self {
        self.mark_seen = mark_seen;
        self
    }

    /// Applies the default body sections and always requests the structure.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.bodies
            .get_or_insert_with(|| DEFAULT_BODIES.iter().map(ToString::to_string).collect());
        self.structure = true;
        self
    }

    /// Body sections to fetch, empty if none were given.
    #[must_use]
    pub fn body_sections(&self) -> &[String] {
        self.bodies.as_deref().unwrap_or_default()
    }

    /// Checks that every body section can be sent inside the FETCH command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for sections containing CR, LF,
    /// NUL, non-ASCII characters or `]`.
    pub fn validate(&self) -> Result<()> {
        for section in self.body_sections() {
            check_inline("body section", section)?;
            if section.contains(']') {
                return Err(Error::InvalidArgument(format!("body section {section:?}")));
            }
        }
        Ok(())
    }

    /// Renders the parenthesized FETCH item list.
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut items = vec![
            "UID".to_string(),
            "FLAGS".to_string(),
            "INTERNALDATE".to_string(),
            "RFC822.SIZE".to_string(),
        ];
        if self.structure {
            items.push("BODYSTRUCTURE".to_string());
        }
        let body = if self.mark_seen { "BODY" } else { "BODY.PEEK" };
        for section in self.body_sections() {
            items.push(format!("{body}[{section}]"));
        }
        format!("({})", items.join(" "))
    }
}

/// How a requested body section maps onto the fetched data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodySection {
    /// The whole message (`BODY[]`).
    Full,
    /// The header, in full or restricted to some fields.
    Header,
    /// The text after the header.
    Text,
    /// Part specifiers such as `1.2` or `1.MIME`.
    Other,
}

impl BodySection {
    pub(crate) fn classify(which: &str) -> Self {
        let upper = which.trim().to_ascii_uppercase();
        if upper.is_empty() {
            Self::Full
        } else if upper == TEXT_SECTION {
            Self::Text
        } else if upper.starts_with("HEADER") {
            Self::Header
        } else {
            Self::Other
        }
    }
}
