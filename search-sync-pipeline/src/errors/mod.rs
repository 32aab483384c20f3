//! Error types for the search sync pipeline.

use search_sync_repository::{SearchError, SourceError};
use thiserror::Error;

/// Errors that can occur in the search sync pipeline.
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    /// A record cannot be mapped to its collection schema.
    #[error("Schema error in collection '{collection}', field '{field}': {reason}")]
    Schema {
        collection: String,
        field: String,
        reason: String,
    },

    /// The collection name is not in the registry.
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// The search engine rejected a request or was unreachable.
    #[error("Engine error: {0}")]
    Engine(#[from] SearchError),

    /// The system of record could not be read.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// A collection definition is inconsistent.
    #[error("Invalid collection definition: {0}")]
    InvalidDefinition(String),

    /// Import options are out of range.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },
}

impl SyncError {
    /// Create a schema error.
    pub fn schema(
        collection: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Schema {
            collection: collection.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown collection error.
    pub fn unknown_collection(name: impl Into<String>) -> Self {
        Self::UnknownCollection(name.into())
    }

    /// Create an invalid definition error.
    pub fn invalid_definition(msg: impl Into<String>) -> Self {
        Self::InvalidDefinition(msg.into())
    }

    /// Create an invalid options error.
    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Self::InvalidOptions(msg.into())
    }

    /// Whether the engine reported a missing collection or document.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Engine(e) if e.is_not_found())
    }
}
