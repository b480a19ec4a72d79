//! Message header map.

use std::collections::HashMap;

/// Header name to values, in the order they appeared.
///
/// Names are stored lower-cased and looked up case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Creates an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to a header.
    pub fn append(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.fields
            .entry(name.as_ref().to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// First value of a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    /// All values of a header, empty if it is absent.
    #[must_use]
    pub fn values(&self, name: &str) -> &[String] {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns true if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(&name.to_ascii_lowercase())
    }

    /// Number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over header names and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Merges RFC 822 header text into this map.
    ///
    /// Folded lines are unfolded, lines without a colon are ignored, and
    /// parsing stops at the first empty line.
    pub fn extend_from_text(&mut self, text: &str) {
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            if line.trim().is_empty() {
                break;
            }

            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = current.as_mut() {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                self.append(name, value);
            }
            current = line
                .split_once(':')
                .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()));
        }

        if let Some((name, value)) = current {
            self.append(name, value);
        }
    }

    /// Parses RFC 822 header text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        headers.extend_from_text(text);
        headers
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}
