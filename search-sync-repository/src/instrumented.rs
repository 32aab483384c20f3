//! Logging decorator for search engine clients.
//!
//! Wraps any [`SearchEngineClient`] and records one structured `tracing`
//! event per engine call: operation, target index, duration and outcome.

use std::future::Future;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::types::{CollectionInfo, DocumentOutcome, ImportAction};
use search_sync_shared::{Document, IndexSchema};

/// A client that logs every call it forwards to `inner`.
pub struct InstrumentedClient<C> {
    inner: C,
}

impl<C: SearchEngineClient> InstrumentedClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    async fn observe<T, F>(&self, operation: &'static str, index: &str, call: F) -> Result<T, SearchError>
    where
        F: Future<Output = Result<T, SearchError>> + Send,
        T: Send,
    {
        let started = Instant::now();
        let result = call.await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => debug!(operation, index, elapsed_ms, outcome = "ok", "Search engine call"),
            // Not-found answers are routine for deletes; keep them out of warnings.
            Err(e) if e.is_not_found() => {
                debug!(operation, index, elapsed_ms, outcome = "not_found", "Search engine call")
            }
            Err(e) => warn!(
                operation,
                index,
                elapsed_ms,
                outcome = "error",
                error = %e,
                "Search engine call failed"
            ),
        }

        result
    }
}

#[async_trait]
impl<C: SearchEngineClient> SearchEngineClient for InstrumentedClient<C> {
    async fn create_collection(&self, schema: &IndexSchema) -> Result<(), SearchError> {
        self.observe(
            "create_collection",
            &schema.name,
            self.inner.create_collection(schema),
        )
        .await
    }

    async fn delete_collection(&self, index_name: &str) -> Result<(), SearchError> {
        self.observe(
            "delete_collection",
            index_name,
            self.inner.delete_collection(index_name),
        )
        .await
    }

    async fn describe_collection(&self, index_name: &str) -> Result<CollectionInfo, SearchError> {
        self.observe(
            "describe_collection",
            index_name,
            self.inner.describe_collection(index_name),
        )
        .await
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, SearchError> {
        self.observe("list_collections", "*", self.inner.list_collections())
            .await
    }

    async fn upsert_document(
        &self,
        index_name: &str,
        document: &Document,
    ) -> Result<(), SearchError> {
        self.observe(
            "upsert_document",
            index_name,
            self.inner.upsert_document(index_name, document),
        )
        .await
    }

    async fn delete_document(
        &self,
        index_name: &str,
        document_id: &str,
    ) -> Result<(), SearchError> {
        self.observe(
            "delete_document",
            index_name,
            self.inner.delete_document(index_name, document_id),
        )
        .await
    }

    async fn import_documents(
        &self,
        index_name: &str,
        documents: &[Document],
        action: ImportAction,
    ) -> Result<Vec<DocumentOutcome>, SearchError> {
        self.observe(
            "import_documents",
            index_name,
            self.inner.import_documents(index_name, documents, action),
        )
        .await
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        self.observe("health_check", "*", self.inner.health_check())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock client that fails every delete with not-found.
    struct MockClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SearchEngineClient for MockClient {
        async fn create_collection(&self, _schema: &IndexSchema) -> Result<(), SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn delete_collection(&self, index_name: &str) -> Result<(), SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SearchError::not_found(index_name))
        }

        async fn describe_collection(
            &self,
            index_name: &str,
        ) -> Result<CollectionInfo, SearchError> {
            Err(SearchError::not_found(index_name))
        }

        async fn list_collections(&self) -> Result<Vec<CollectionInfo>, SearchError> {
            Ok(vec![])
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
            document_id: &str,
        ) -> Result<(), SearchError> {
            Err(SearchError::not_found(document_id))
        }

        async fn import_documents(
            &self,
            _index_name: &str,
            documents: &[Document],
            _action: ImportAction,
        ) -> Result<Vec<DocumentOutcome>, SearchError> {
            Ok(documents
                .iter()
                .map(|d| DocumentOutcome::accepted(d.id()))
                .collect())
        }

        async fn health_check(&self) -> Result<bool, SearchError> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_results_pass_through_unchanged() {
        let client = InstrumentedClient::new(MockClient {
            calls: AtomicUsize::new(0),
        });

        assert!(client.health_check().await.unwrap());
        assert!(client
            .delete_collection("books")
            .await
            .unwrap_err()
            .is_not_found());
        assert_eq!(client.inner().calls.load(Ordering::SeqCst), 1);
    }
}
