//! Error types for value operations

use std::fmt;

/// Error type for value operations
#[derive(Debug, Clone, PartialEq)]
pub enum ValueError {
    /// Type mismatch error
    TypeError {
        expected: &'static str,
        actual: &'static str,
    },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::TypeError { expected, actual } => {
                write!(f, "expected {}, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for ValueError {}

impl From<ValueError> for crate::Error {
    fn from(err: ValueError) -> Self {
        crate::Error::Type(err.to_string())
    }
}

/// Result type for value operations
pub type ValueResult<T> = Result<T, ValueError>;
