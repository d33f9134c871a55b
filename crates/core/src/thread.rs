//! Email thread identity

use serde::{Deserialize, Serialize};

/// Identifier of a webmail conversation thread
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    /// Wrap an identifier; empty strings are not thread ids
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// Extract the thread id from a location hash such as `#inbox/18c2f0a1b2`
    ///
    /// The id is the last path segment when it is a run of lowercase hex
    /// digits. List views (`#inbox`, `#label/Work`) have no thread id.
    pub fn from_location_hash(hash: &str) -> Option<Self> {
        let (_, last) = hash.rsplit_once('/')?;
        if !last.is_empty() && last.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            Some(Self(last.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ThreadId({})", self.0)
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
