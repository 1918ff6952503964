//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Subscriber identifier - newtype over the recipient's chat id.
///
/// Stable for the lifetime of the chat. Serialized transparently so the
/// subscriber file is a plain JSON array of integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(i64);

impl SubscriberId {
    /// Create a new `SubscriberId` from a raw chat id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw chat id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SubscriberId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}
