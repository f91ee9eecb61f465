//! Variable names.

use serde::{Deserialize, Serialize};

/// Variable name - a single lowercase ASCII letter
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Var(char);

impl Var {
    /// Create a variable name, rejecting anything outside `a..=z`
    #[must_use]
    pub const fn new(c: char) -> Option<Self> {
        if c.is_ascii_lowercase() {
            Some(Self(c))
        } else {
            None
        }
    }

    /// Get the underlying letter
    #[must_use]
    pub const fn as_char(&self) -> char {
        self.0
    }
}

impl std::fmt::Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
