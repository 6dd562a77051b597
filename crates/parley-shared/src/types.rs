use serde::{Deserialize, Serialize};

// Server-assigned user identifier, opaque to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-assigned message identifier. This is the sole identity of a
/// message; sender/recipient/timestamp tuples are not reliable for
/// deduplication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Media,
}

/// Unordered pair of user ids identifying a one-to-one conversation.
///
/// Construction normalizes the pair, so `new(a, b) == new(b, a)` and the
/// key can be used directly in hash maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadKey {
    lo: UserId,
    hi: UserId,
}

impl ThreadKey {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    pub fn contains(&self, id: &UserId) -> bool {
        &self.lo == id || &self.hi == id
    }

    /// The other participant, given one of the pair. `None` if `id` is
    /// not a participant.
    pub fn peer_of(&self, id: &UserId) -> Option<&UserId> {
        if id == &self.lo {
            Some(&self.hi)
        } else if id == &self.hi {
            Some(&self.lo)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ThreadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}<->{}", self.lo, self.hi)
    }
}
