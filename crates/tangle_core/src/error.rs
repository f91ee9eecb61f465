//! Core error types for TANGLE.

use std::fmt;

use crate::var::Var;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A command read a variable that is not present in the store
    UndefinedVariable {
        /// The variable that was read
        var: Var,
    },

    /// A command statement could not be parsed
    MalformedCommand {
        /// The offending statement
        statement: String,
        /// Why it was rejected
        reason: String,
    },

    /// A space document could not be decoded
    InvalidDocument {
        /// Decoder message
        message: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedVariable { var } => {
                write!(f, "Undefined variable: {}", var)
            }
            Self::MalformedCommand { statement, reason } => {
                write!(f, "Malformed command {:?}: {}", statement, reason)
            }
            Self::InvalidDocument { message } => {
                write!(f, "Invalid space document: {}", message)
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidDocument {
            message: err.to_string(),
        }
    }
}
