//! Search engine client trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for different backend implementations (OpenSearch, mock, etc.).

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::types::{CollectionInfo, DocumentOutcome, ImportAction};
use search_sync_shared::{Document, IndexSchema};

/// Abstract interface for search engine operations.
///
/// This trait defines all the operations the sync core needs from a search
/// engine: collection lifecycle and per-document writes.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, SearchError>`. Missing collections and
/// documents are reported as `SearchError::NotFound` so callers can decide
/// whether that matters to them.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Create a collection from its schema.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the collection was created
    /// * `Err(SearchError::AlreadyExists)` - If a collection with that name exists
    /// * `Err(SearchError)` - If creation fails for any other reason
    async fn create_collection(&self, schema: &IndexSchema) -> Result<(), SearchError>;

    /// Delete a collection and all of its documents.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the collection was deleted
    /// * `Err(SearchError::NotFound)` - If the collection does not exist
    async fn delete_collection(&self, index_name: &str) -> Result<(), SearchError>;

    /// Describe a live collection.
    async fn describe_collection(&self, index_name: &str) -> Result<CollectionInfo, SearchError>;

    /// List every collection known to the engine.
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, SearchError>;

    /// Insert or replace a single document by its id.
    ///
    /// # Arguments
    ///
    /// * `index_name` - The collection to write to
    /// * `document` - The transformed document
    async fn upsert_document(&self, index_name: &str, document: &Document)
        -> Result<(), SearchError>;

    /// Delete a single document by its id.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was deleted
    /// * `Err(SearchError::NotFound)` - If there was no such document
    async fn delete_document(&self, index_name: &str, document_id: &str)
        -> Result<(), SearchError>;

    /// Import documents in a single request.
    ///
    /// Per-document rejections are returned in the outcome list, in input
    /// order. An `Err` means the request as a whole failed and no outcome
    /// is known for any document.
    async fn import_documents(
        &self,
        index_name: &str,
        documents: &[Document],
        action: ImportAction,
    ) -> Result<Vec<DocumentOutcome>, SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine is unhealthy
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}
