//! Disabled search engine client.
//!
//! Stands in for a real engine when indexing is switched off (for example
//! `OPENSEARCH_URL=null`). Every call succeeds and every document is
//! accepted; nothing is stored.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::types::{CollectionInfo, DocumentOutcome, ImportAction};
use search_sync_shared::{Document, IndexSchema};

/// URL value that selects [`NullClient`].
pub const NULL_URL: &str = "null";

/// A client that answers every call with success.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullClient;

impl NullClient {
    pub fn new() -> Self {
        Self
    }

    /// Whether `url` asks for the disabled client.
    pub fn is_null_url(url: &str) -> bool {
        url.trim().eq_ignore_ascii_case(NULL_URL)
    }
}

#[async_trait]
impl SearchEngineClient for NullClient {
    async fn create_collection(&self, schema: &IndexSchema) -> Result<(), SearchError> {
        debug!(index = %schema.name, "Search disabled, skipping collection creation");
        Ok(())
    }

    async fn delete_collection(&self, _index_name: &str) -> Result<(), SearchError> {
        Ok(())
    }

    async fn describe_collection(&self, index_name: &str) -> Result<CollectionInfo, SearchError> {
        Ok(CollectionInfo {
            name: index_name.to_string(),
            num_documents: None,
            details: Value::Null,
        })
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, SearchError> {
        Ok(Vec::new())
    }

    async fn upsert_document(
        &self,
        _index_name: &str,
        _document: &Document,
    ) -> Result<(), SearchError> {
        Ok(())
    }

    async fn delete_document(
        &self,
        _index_name: &str,
        _document_id: &str,
    ) -> Result<(), SearchError> {
        Ok(())
    }

    async fn import_documents(
        &self,
        index_name: &str,
        documents: &[Document],
        _action: ImportAction,
    ) -> Result<Vec<DocumentOutcome>, SearchError> {
        debug!(index = %index_name, count = documents.len(), "Search disabled, accepting batch");
        Ok(documents
            .iter()
            .map(|document| DocumentOutcome::accepted(document.id()))
            .collect())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn test_is_null_url() {
        assert!(NullClient::is_null_url("null"));
        assert!(NullClient::is_null_url(" NULL "));
        assert!(!NullClient::is_null_url("http://localhost:9200"));
        assert!(!NullClient::is_null_url(""));
    }

    #[tokio::test]
    async fn test_accepts_every_document() {
        let client = NullClient::new();
        let documents = vec![
            Document::new("1", Map::new()),
            Document::new("2", Map::new()),
        ];

        let outcomes = client
            .import_documents("books", &documents, ImportAction::Create)
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|outcome| outcome.success));
        assert_eq!(outcomes[1].document_id, "2");
    }

    #[tokio::test]
    async fn test_lifecycle_calls_succeed() {
        let client = NullClient::new();

        assert!(client.delete_collection("books").await.is_ok());
        assert!(client.delete_document("books", "1").await.is_ok());
        assert!(client.list_collections().await.unwrap().is_empty());
        assert_eq!(client.describe_collection("books").await.unwrap().name, "books");
        assert!(client.health_check().await.unwrap());
    }
}
