use crate::{CoreError, CoreResult};

use std::{fmt, panic::Location, str::FromStr};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// A normalized key-combination string such as `ctrl+shift+up`.
///
/// Segments are trimmed and lowercased so that two spellings of the same
/// chord compare equal and register a single OS hook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyCombination(String);

impl KeyCombination {
    /// Parse and normalize a combination.
    #[track_caller]
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let segments: Vec<String> = raw
            .split('+')
            .map(|s| s.trim().to_ascii_lowercase())
            .collect();

        if segments.iter().any(|s| s.is_empty()) {
            return Err(CoreError::InvalidKeyCombination {
                combination: raw.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self(segments.join("+")))
    }

    /// The normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for KeyCombination {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for KeyCombination {
    type Error = CoreError;

    #[track_caller]
    fn try_from(value: String) -> CoreResult<Self> {
        Self::parse(&value)
    }
}

impl From<KeyCombination> for String {
    fn from(value: KeyCombination) -> Self {
        value.0
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
