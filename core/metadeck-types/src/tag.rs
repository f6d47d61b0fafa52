//! Player identity as reported by the upstream ranking API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A player tag in provider format: `#` followed by alphanumerics.
///
/// Tags coming back from the upstream API are trusted and only normalized
/// (a missing `#` is prepended). Tags typed in by a user go through
/// [`PlayerTag::parse`], which also checks the character set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PlayerTag(String);

impl PlayerTag {
    /// Normalizes a raw tag, prepending `#` when it is missing.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with('#') {
            Self(raw.to_string())
        } else {
            Self(format!("#{raw}"))
        }
    }

    /// Parses and validates a user-supplied tag.
    pub fn parse(raw: &str) -> crate::Result<Self> {
        let tag = Self::new(raw);
        let body = &tag.0[1..];
        if body.is_empty() || !body.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(crate::Error::InvalidTag(raw.to_string()));
        }
        Ok(tag)
    }

    /// Returns the tag including its leading `#`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Percent-encodes the tag for use as a URL path segment (`#` becomes `%23`).
    #[must_use]
    pub fn url_segment(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl From<String> for PlayerTag {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<PlayerTag> for String {
    fn from(tag: PlayerTag) -> Self {
        tag.0
    }
}

impl fmt::Display for PlayerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PlayerTag {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One entry of the global ladder ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub tag: PlayerTag,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rank: Option<u32>,
}
