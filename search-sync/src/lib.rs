//! # Search Sync
//!
//! Entry point library for the search sync command-line tool: configuration
//! loading, dependency wiring and the application error type.

pub mod config;

pub use config::{Dependencies, SyncConfig};

use thiserror::Error;

/// Errors that can occur during startup or while running a command.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The collections file is not valid JSON or has the wrong shape.
    #[error("Invalid collections file {path}: {source}")]
    ConfigParseError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] search_sync_pipeline::SyncError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] search_sync_repository::SearchError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
