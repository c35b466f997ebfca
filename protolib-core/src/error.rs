//! Error types for Protolib

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid version string '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Type error: {0}")]
    Type(String),

    #[error("{group}.{name} is not a function")]
    UnknownMethod { group: String, name: String },

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() {
            Error::Parse(err.to_string())
        } else {
            Error::Serialize(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
