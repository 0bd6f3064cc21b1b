//! Record name type.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// A trimmed, non-empty name for a station or line.
///
/// Names are compared exactly after trimming, so `" Gangnam "` and
/// `"Gangnam"` are the same name but `"gangnam"` is not.
///
/// # Examples
///
/// ```
/// use subway_admin::domain::Name;
///
/// let name = Name::parse("station", "  Jamsil ").unwrap();
/// assert_eq!(name.as_str(), "Jamsil");
///
/// assert!(Name::parse("station", "   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Parse a name, trimming surrounding whitespace.
    ///
    /// `kind` names the record type in the error message.
    pub fn parse(kind: &'static str, s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::BlankName(kind));
        }
        Ok(Name(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Name {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Name::parse("record", &value)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
