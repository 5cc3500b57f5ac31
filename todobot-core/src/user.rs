//! User identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, stable identifier distinguishing one user's task list from
/// another's.
///
/// Wraps whatever identity string the chat platform supplies for the
/// author of an inbound message. The engine never inspects the
/// contents; only equality and ordering matter. Serializes as the bare
/// string, so it doubles as the JSON object key in the snapshot
/// document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a user identifier from a string representation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this user ID.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
