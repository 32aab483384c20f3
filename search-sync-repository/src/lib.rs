//! # Search Sync Repository
//!
//! This crate provides the traits the sync core uses to reach its
//! collaborators (search engine, system of record, data-layer
//! notifications), their error types, and concrete implementations: an
//! OpenSearch client, a disabled client for running without an engine, a
//! logging decorator and a JSON-lines record source.

pub mod errors;
pub mod instrumented;
pub mod interfaces;
pub mod jsonl;
pub mod null_client;
pub mod opensearch;
pub mod types;

pub use errors::{SearchError, SourceError};
pub use instrumented::InstrumentedClient;
pub use interfaces::{
    MutationEvent, MutationKind, MutationObserver, RecordSource, SearchEngineClient,
};
pub use jsonl::JsonLinesSource;
pub use null_client::NullClient;
pub use opensearch::{IndexSettings, OpenSearchClient};
pub use types::{CollectionInfo, DocumentOutcome, ImportAction};
