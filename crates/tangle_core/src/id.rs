//! Instance identifiers and the order key used for tie-breaking.
//!
//! Ids are plain integers: they key the exchange-format `insts` map and
//! double as the deterministic tie-breaker when sequence numbers tie.

use serde::{Deserialize, Serialize};

/// Instance identifier - identifies one instance in a space
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Create an id from its raw value
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for InstanceId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordering key `(seq, id)` - the total order behind every tie-break
///
/// Compared lexicographically: the sequence number first, the id as the
/// sole tie-breaker. Keys are reconstructed from an instance's current
/// fields whenever one is needed, never cached across graph mutation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct OrderKey {
    /// Logical order number (not unique across instances)
    pub seq: u64,
    /// Tie-breaking instance id (unique)
    pub id: InstanceId,
}

impl OrderKey {
    /// Create a new order key
    #[must_use]
    pub const fn new(seq: u64, id: InstanceId) -> Self {
        Self { seq, id }
    }
}

impl std::fmt::Display for OrderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.seq, self.id)
    }
}
