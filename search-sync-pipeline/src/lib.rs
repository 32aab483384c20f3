//! # Search Sync Pipeline
//!
//! This crate keeps a search engine in step with a relational system of
//! record: it maps records onto collection schemas and writes them to the
//! engine, either in bulk or as individual changes happen.
//!
//! ## Architecture
//!
//! Components, leaves first:
//!
//! 1. **Resolver**: reads dotted attribute paths from records
//! 2. **Transformer**: builds index schemas and documents from definitions
//! 3. **Collections**: the definition registry and engine collection lifecycle
//! 4. **Documents**: single writes and batch imports
//! 5. **Indexer**: stages data-layer mutations and applies them on flush
//! 6. **Importer**: paged full imports
//! 7. **Orchestrator**: the [`SyncService`] facade used by front-ends

pub mod collections;
pub mod documents;
pub mod errors;
pub mod importer;
pub mod indexer;
pub mod notifications;
pub mod orchestrator;
pub mod resolver;
pub mod transformer;

#[cfg(test)]
mod test_support;

pub use collections::{CollectionManager, CollectionRegistry};
pub use documents::{DocumentManager, DocumentManagerConfig};
pub use errors::SyncError;
pub use importer::{BulkImporter, ImportOptions, ImportProgress, LogProgress};
pub use indexer::{ChangeIndexer, IndexerState};
pub use notifications::MutationBus;
pub use orchestrator::{CollectionOutcome, CollectionStep, SyncService};
pub use resolver::{AccessStrategy, AccessorAccess, PathResolver, PropertyAccess, Resolved};
pub use transformer::SchemaTransformer;
