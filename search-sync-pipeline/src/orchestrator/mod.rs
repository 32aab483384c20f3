//! Sync service.
//!
//! Front-end facing operations: recreate collections and run bulk imports,
//! reporting an outcome per requested collection. One collection failing
//! never stops the others.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::collections::{CollectionManager, CollectionRegistry};
use crate::documents::DocumentManager;
use crate::errors::SyncError;
use crate::importer::{BulkImporter, ImportOptions};
use crate::indexer::ChangeIndexer;
use crate::transformer::SchemaTransformer;
use search_sync_repository::{RecordSource, SearchEngineClient};
use search_sync_shared::ImportResult;

/// Step of a collection recreation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStep {
    Delete,
    Create,
}

impl fmt::Display for CollectionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete => write!(f, "delete"),
            Self::Create => write!(f, "create"),
        }
    }
}

/// Result of recreating one collection.
#[derive(Debug, Clone)]
pub struct CollectionOutcome {
    pub name: String,
    /// Engine index name, `None` when the collection is not registered.
    pub index_name: Option<String>,
    /// Last step attempted.
    pub step: CollectionStep,
    pub result: Result<(), SyncError>,
}

impl CollectionOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Wires the core components over one engine client and one record source.
pub struct SyncService {
    registry: Arc<CollectionRegistry>,
    transformer: Arc<SchemaTransformer>,
    documents: Arc<DocumentManager>,
    collections: CollectionManager,
    importer: BulkImporter,
}

impl SyncService {
    pub fn new(
        registry: Arc<CollectionRegistry>,
        client: Arc<dyn SearchEngineClient>,
        source: Arc<dyn RecordSource>,
        documents: Arc<DocumentManager>,
    ) -> Self {
        let transformer = Arc::new(SchemaTransformer::new());
        let collections =
            CollectionManager::new(client, registry.clone(), transformer.clone());
        let importer = BulkImporter::new(
            registry.clone(),
            transformer.clone(),
            source,
            documents.clone(),
        );

        Self {
            registry,
            transformer,
            documents,
            collections,
            importer,
        }
    }

    /// Replace the default importer, e.g. to attach a progress reporter.
    pub fn with_importer(mut self, configure: impl FnOnce(BulkImporter) -> BulkImporter) -> Self {
        self.importer = configure(self.importer);
        self
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    pub fn collections(&self) -> &CollectionManager {
        &self.collections
    }

    /// A change-driven indexer sharing this service's components.
    pub fn change_indexer(&self) -> ChangeIndexer {
        ChangeIndexer::new(
            self.registry.clone(),
            self.transformer.clone(),
            self.documents.clone(),
        )
    }

    fn requested(&self, names: Option<&[String]>) -> Vec<String> {
        match names {
            Some(names) => names.to_vec(),
            None => self.registry.names(),
        }
    }

    /// Delete (when present) and create each requested collection, or every
    /// registered one when `names` is `None`.
    #[instrument(skip(self))]
    pub async fn create_collections(&self, names: Option<&[String]>) -> Vec<CollectionOutcome> {
        let mut outcomes = Vec::new();

        for name in self.requested(names) {
            let outcome = self.recreate(&name).await;
            match &outcome.result {
                Ok(()) => info!(collection = %name, "Collection recreated"),
                Err(e) => error!(
                    collection = %name,
                    step = %outcome.step,
                    error = %e,
                    "Collection recreation failed"
                ),
            }
            outcomes.push(outcome);
        }

        outcomes
    }

    async fn recreate(&self, name: &str) -> CollectionOutcome {
        let index_name = match self.registry.get(name) {
            Ok(definition) => definition.index_name.clone(),
            Err(e) => {
                return CollectionOutcome {
                    name: name.to_string(),
                    index_name: None,
                    step: CollectionStep::Delete,
                    result: Err(e),
                }
            }
        };

        let outcome = |step, result| CollectionOutcome {
            name: name.to_string(),
            index_name: Some(index_name.clone()),
            step,
            result,
        };

        match self.collections.delete_collection(name).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return outcome(CollectionStep::Delete, Err(e)),
        }

        let created = self.collections.create_collection(name).await.map(|_| ());
        outcome(CollectionStep::Create, created)
    }

    /// Run the bulk importer for one collection.
    pub async fn import_collection(
        &self,
        name: &str,
        options: &ImportOptions,
    ) -> Result<ImportResult, SyncError> {
        self.importer.import(name, options).await
    }

    /// Import each requested collection, or every registered one.
    #[instrument(skip(self, options))]
    pub async fn import_collections(
        &self,
        names: Option<&[String]>,
        options: &ImportOptions,
    ) -> Vec<(String, Result<ImportResult, SyncError>)> {
        let mut results = Vec::new();

        for name in self.requested(names) {
            let result = self.importer.import(&name, options).await;
            match &result {
                Ok(imported) if !imported.is_success() => warn!(
                    collection = %name,
                    failed = imported.failed(),
                    "Import finished with failures"
                ),
                Ok(_) => {}
                Err(e) => error!(collection = %name, error = %e, "Import failed"),
            }
            results.push((name, result));
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{authors_definition, book, books_definition, RecordingClient, VecSource};
    use search_sync_repository::{MutationEvent, SearchEngineClient};
    use search_sync_shared::Document;
    use serde_json::Map;

    fn service(client: Arc<RecordingClient>) -> SyncService {
        let registry = Arc::new(
            CollectionRegistry::new(vec![books_definition(), authors_definition()]).unwrap(),
        );
        let source = Arc::new(
            VecSource::new()
                .with("book", vec![book(1, "Total Khéops"), book(2, "Chourmo"), book(3, "Solea")]),
        );
        let documents = Arc::new(DocumentManager::new(client.clone()));
        SyncService::new(registry, client, source, documents)
    }

    #[tokio::test]
    async fn test_create_collections_deletes_then_creates() {
        let client = RecordingClient::new();
        let service = service(client.clone());

        let outcomes = service.create_collections(None).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(CollectionOutcome::is_success));
        assert_eq!(
            client.calls(),
            vec![
                "delete_collection test_authors",
                "create_collection test_authors",
                "delete_collection test_books",
                "create_collection test_books",
            ]
        );
    }

    #[tokio::test]
    async fn test_recreate_leaves_no_stale_documents() {
        let client = RecordingClient::new();
        let service = service(client.clone());
        let names = vec!["books".to_string()];

        service.create_collections(Some(&names)).await;
        client.seed("test_books", Document::new("stale", Map::new()));
        assert_eq!(client.ids("test_books"), vec!["stale"]);

        let outcomes = service.create_collections(Some(&names)).await;

        assert!(outcomes[0].is_success());
        assert!(client.ids("test_books").is_empty());
    }

    #[tokio::test]
    async fn test_unknown_name_does_not_stop_others() {
        let client = RecordingClient::new();
        let service = service(client.clone());
        let names = vec!["missing".to_string(), "books".to_string()];

        let outcomes = service.create_collections(Some(&names)).await;

        assert!(matches!(
            outcomes[0].result,
            Err(SyncError::UnknownCollection(_))
        ));
        assert_eq!(outcomes[0].index_name, None);
        assert!(outcomes[1].is_success());
        assert!(client.calls().iter().all(|call| !call.contains("missing")));
    }

    #[tokio::test]
    async fn test_existing_collection_is_replaced() {
        let client = RecordingClient::new();
        let service = service(client.clone());
        client
            .create_collection(&SchemaTransformer::new().build_schema(&books_definition()))
            .await
            .unwrap();
        let names = vec!["books".to_string(), "books".to_string()];

        let outcomes = service.create_collections(Some(&names)).await;

        assert!(outcomes.iter().all(CollectionOutcome::is_success));
        assert_eq!(
            client.calls_starting_with("delete_collection"),
            vec!["delete_collection test_books", "delete_collection test_books"]
        );
        assert_eq!(outcomes[1].step, CollectionStep::Create);
        assert_eq!(outcomes[1].index_name.as_deref(), Some("test_books"));
    }

    #[tokio::test]
    async fn test_import_collections_reports_each() {
        let client = RecordingClient::new();
        let service = service(client.clone());
        service.create_collections(None).await;

        let results = service
            .import_collections(None, &ImportOptions::default().with_page_size(2))
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "authors");
        assert!(matches!(results[0].1, Err(SyncError::Source(_))));
        assert_eq!(results[1].0, "books");
        assert_eq!(results[1].1.as_ref().unwrap().succeeded, 3);
        assert_eq!(client.ids("test_books"), vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_change_indexer_uses_shared_registry() {
        let client = RecordingClient::new();
        let service = service(client.clone());
        service.create_collections(None).await;

        let indexer = service.change_indexer();
        indexer
            .stage(&MutationEvent::created("book", book(8, "Solea")))
            .await;
        indexer.flush().await;

        assert_eq!(client.ids("test_books"), vec!["8"]);
    }
}
