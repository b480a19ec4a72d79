//! Mailbox addresses from `To`-style header values.

use std::fmt;

/// An address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Display name, if given.
    pub name: Option<String>,
    /// The address itself, e.g. `alice@example.com`.
    pub address: String,
}

impl Address {
    /// Creates an address without a display name.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: None,
            address: address.into(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parses one address: `Name <addr>`, `"Name" <addr>`, `<addr>` or `addr`.
    ///
    /// Returns `None` for blank input.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let Some((name, rest)) = text.rsplit_once('<') else {
            return Some(Self::new(text));
        };
        let address = rest.trim_end().trim_end_matches('>').trim();
        let name = unquote(name.trim());

        Some(Self {
            name: (!name.is_empty()).then(|| name.to_string()),
            address: address.to_string(),
        })
    }

    /// Parses a comma separated address list.
    ///
    /// Commas inside quoted display names or angle brackets do not split.
    #[must_use]
    pub fn parse_list(text: &str) -> Vec<Self> {
        split_list(text).filter_map(Self::parse).collect()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.address),
            None => f.write_str(&self.address),
        }
    }
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
        .trim()
}

fn split_list(text: &str) -> impl Iterator<Item = &str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut angle = false;

    for (i, c) in text.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '<' if !quoted => angle = true,
            '>' if !quoted => angle = false,
            ',' if !quoted && !angle => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts.into_iter()
}
