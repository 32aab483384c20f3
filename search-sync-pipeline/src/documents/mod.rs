//! Document manager.
//!
//! Single-document writes and batch imports against the search engine, with
//! per-document accounting for batches.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::errors::SyncError;
use search_sync_repository::{ImportAction, SearchEngineClient};
use search_sync_shared::{Document, ImportResult};

/// Configuration for the document manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentManagerConfig {
    /// Largest batch accepted by `import_batch`, `None` for no limit.
    pub max_batch_size: Option<usize>,
}

impl Default for DocumentManagerConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(1000),
        }
    }
}

impl DocumentManagerConfig {
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
        }
    }
}

/// Writes documents to the search engine.
pub struct DocumentManager {
    client: Arc<dyn SearchEngineClient>,
    config: DocumentManagerConfig,
}

impl DocumentManager {
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self {
            client,
            config: DocumentManagerConfig::default(),
        }
    }

    pub fn with_config(client: Arc<dyn SearchEngineClient>, config: DocumentManagerConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> DocumentManagerConfig {
        self.config
    }

    /// Insert or replace one document by primary key.
    #[instrument(skip(self, document), fields(document_id = %document.id()))]
    pub async fn upsert(&self, index_name: &str, document: &Document) -> Result<(), SyncError> {
        self.client.upsert_document(index_name, document).await?;
        Ok(())
    }

    /// Remove one document. A not-found answer is returned as an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, index_name: &str, document_id: &str) -> Result<(), SyncError> {
        self.client.delete_document(index_name, document_id).await?;
        Ok(())
    }

    /// Submit `documents` as one batch request.
    ///
    /// Individual rejections are recorded in the returned [`ImportResult`];
    /// only a failure of the request as a whole is an error.
    ///
    /// # Errors
    ///
    /// `SyncError::BatchSizeExceeded` before any engine call when the batch
    /// is larger than the configured limit; `SyncError::Engine` when the
    /// request fails as a whole.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn import_batch(
        &self,
        index_name: &str,
        documents: &[Document],
        action: ImportAction,
    ) -> Result<ImportResult, SyncError> {
        let mut result = ImportResult::new();
        if documents.is_empty() {
            return Ok(result);
        }

        if let Some(max) = self.config.max_batch_size {
            if documents.len() > max {
                return Err(SyncError::BatchSizeExceeded {
                    provided: documents.len(),
                    max,
                });
            }
        }

        let outcomes = self
            .client
            .import_documents(index_name, documents, action)
            .await?;

        for (position, document) in documents.iter().enumerate() {
            match outcomes.get(position) {
                Some(outcome) if outcome.success => result.record_success(),
                Some(outcome) => {
                    let reason = outcome.error.as_deref().unwrap_or("rejected");
                    result.record_failure(format!(
                        "{}: document {}: {}",
                        index_name, outcome.document_id, reason
                    ));
                }
                None => result.record_failure(format!(
                    "{}: document {}: no response from engine",
                    index_name,
                    document.id()
                )),
            }
        }

        if result.is_success() {
            debug!(index = index_name, succeeded = result.succeeded, "Imported batch");
        } else {
            warn!(
                index = index_name,
                succeeded = result.succeeded,
                failed = result.failed(),
                "Batch imported with rejections"
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingClient;
    use search_sync_shared::IndexSchema;
    use serde_json::{json, Map, Value};

    fn doc(id: &str) -> Document {
        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::String(id.to_string()));
        fields.insert("title".to_string(), json!(format!("Book {}", id)));
        Document::new(id, fields)
    }

    async fn client_with_index() -> Arc<RecordingClient> {
        let client = RecordingClient::new();
        let schema = IndexSchema {
            name: "books".to_string(),
            fields: vec![],
            default_sorting_field: "sortable_id".to_string(),
            enable_nested_fields: false,
        };
        client.create_collection(&schema).await.unwrap();
        client
    }

    #[tokio::test]
    async fn test_import_batch_counts_rejections_without_aborting() {
        let client = client_with_index().await;
        client.reject("2");
        let manager = DocumentManager::new(client.clone());

        let result = manager
            .import_batch("books", &[doc("1"), doc("2"), doc("3")], ImportAction::Upsert)
            .await
            .unwrap();

        assert_eq!(result.submitted, 3);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed(), 1);
        assert!(result.failures[0].contains("document 2"));
        assert_eq!(client.ids("books"), vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_import_batch_transport_failure_is_fatal() {
        let client = client_with_index().await;
        client.fail_imports();
        let manager = DocumentManager::new(client.clone());

        let result = manager
            .import_batch("books", &[doc("1")], ImportAction::Upsert)
            .await;

        assert!(matches!(result, Err(SyncError::Engine(_))));
    }

    #[tokio::test]
    async fn test_import_batch_size_limit() {
        let client = client_with_index().await;
        let manager = DocumentManager::with_config(
            client.clone(),
            DocumentManagerConfig {
                max_batch_size: Some(2),
            },
        );

        let result = manager
            .import_batch(
                "books",
                &[doc("1"), doc("2"), doc("3")],
                ImportAction::Upsert,
            )
            .await;

        assert!(matches!(
            result,
            Err(SyncError::BatchSizeExceeded {
                provided: 3,
                max: 2
            })
        ));
        assert!(client.calls_starting_with("import_documents").is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_skips_engine() {
        let client = client_with_index().await;
        let manager = DocumentManager::new(client.clone());

        let result = manager
            .import_batch("books", &[], ImportAction::Upsert)
            .await
            .unwrap();

        assert_eq!(result, ImportResult::default());
        assert!(client.calls_starting_with("import_documents").is_empty());
    }

    #[tokio::test]
    async fn test_single_document_operations() {
        let client = client_with_index().await;
        let manager = DocumentManager::with_config(client.clone(), DocumentManagerConfig::unlimited());

        manager.upsert("books", &doc("7")).await.unwrap();
        assert!(client.document("books", "7").is_some());

        manager.delete("books", "7").await.unwrap();
        assert!(manager.delete("books", "7").await.unwrap_err().is_not_found());
    }
}
