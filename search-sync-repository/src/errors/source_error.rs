//! Record source error types.

use thiserror::Error;

/// Errors that can occur while reading records from the data store.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    /// The data store has no records of this type.
    #[error("Unknown source type: {0}")]
    UnknownSourceType(String),

    /// Reading from the data store failed.
    #[error("IO error: {0}")]
    Io(String),

    /// A stored record could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SourceError {
    /// Create an IO error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
