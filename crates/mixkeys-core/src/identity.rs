use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

/// Process name used as the join key between config, live sessions and the UI.
///
/// Comparison, ordering and hashing ignore letter case (full Unicode
/// lowercasing), so `Spotify.exe` and `spotify.exe` name the same application. The original spelling is kept for
/// display and for the persisted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationIdentity(String);

impl ApplicationIdentity {
    /// Wrap a process name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as originally spelled.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive match against a raw process name.
    pub fn matches(&self, process_name: &str) -> bool {
        self.folded().eq(fold(process_name))
    }

    fn folded(&self) -> impl Iterator<Item = char> + '_ {
        fold(&self.0)
    }
}

fn fold(name: &str) -> impl Iterator<Item = char> + '_ {
    name.chars().flat_map(char::to_lowercase)
}

impl PartialEq for ApplicationIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Eq for ApplicationIdentity {}

impl Ord for ApplicationIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

impl PartialOrd for ApplicationIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for ApplicationIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for c in self.folded() {
            state.write_u32(u32::from(c));
        }
        state.write_u32(u32::MAX);
    }
}

impl fmt::Display for ApplicationIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
