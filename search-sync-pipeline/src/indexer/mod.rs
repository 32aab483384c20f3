//! Change-driven indexer.
//!
//! Stages one write intent per `(index, document id)` while a unit of work
//! is open and executes them against the [`DocumentManager`] at the flush
//! boundary. Later intents for the same key replace earlier ones.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, trace, warn};

use crate::collections::CollectionRegistry;
use crate::documents::DocumentManager;
use crate::errors::SyncError;
use crate::transformer::SchemaTransformer;
use search_sync_repository::{MutationEvent, MutationKind, MutationObserver};
use search_sync_shared::{CollectionDefinition, Document, ImportResult};

/// Lifecycle of one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexerState {
    /// Nothing staged.
    Idle,
    /// At least one intent staged since the last flush.
    Collecting,
    /// Staged intents are being executed.
    Flushing,
}

#[derive(Debug, Clone)]
enum Intent {
    Upsert(Document),
    Delete,
}

type IntentKey = (String, String);

struct Staging {
    state: IndexerState,
    intents: BTreeMap<IntentKey, Intent>,
    /// Mutations that could not be staged, reported with the next flush.
    rejected: ImportResult,
}

/// Keeps the index in step with data-layer mutations.
pub struct ChangeIndexer {
    registry: Arc<CollectionRegistry>,
    transformer: Arc<SchemaTransformer>,
    documents: Arc<DocumentManager>,
    staging: Mutex<Staging>,
}

impl ChangeIndexer {
    pub fn new(
        registry: Arc<CollectionRegistry>,
        transformer: Arc<SchemaTransformer>,
        documents: Arc<DocumentManager>,
    ) -> Self {
        Self {
            registry,
            transformer,
            documents,
            staging: Mutex::new(Staging {
                state: IndexerState::Idle,
                intents: BTreeMap::new(),
                rejected: ImportResult::new(),
            }),
        }
    }

    pub async fn state(&self) -> IndexerState {
        self.staging.lock().await.state
    }

    /// Number of intents waiting for the next flush.
    pub async fn staged(&self) -> usize {
        self.staging.lock().await.intents.len()
    }

    /// Stage intents for every collection fed by the event's source type.
    ///
    /// Entities without a matching collection are ignored. A mutation that
    /// cannot be transformed is recorded as a failure and stages nothing,
    /// leaving any earlier intent for the same key in place.
    pub async fn stage(&self, event: &MutationEvent) {
        let definitions = self.registry.definitions_for_source(&event.source_type);
        if definitions.is_empty() {
            trace!(source_type = %event.source_type, "No collection for source type");
            return;
        }

        let mut staging = self.staging.lock().await;
        for definition in definitions {
            match self.intent_for(&definition, event) {
                Ok((id, intent)) => {
                    staging
                        .intents
                        .insert((definition.index_name.clone(), id), intent);
                }
                Err(reason) => {
                    warn!(
                        collection = %definition.name,
                        kind = ?event.kind,
                        error = %reason,
                        "Dropping mutation that cannot be indexed"
                    );
                    staging
                        .rejected
                        .record_failure(format!("{}: {}", definition.name, reason));
                }
            }
        }

        if staging.state == IndexerState::Idle {
            staging.state = IndexerState::Collecting;
        }
    }

    fn intent_for(
        &self,
        definition: &CollectionDefinition,
        event: &MutationEvent,
    ) -> Result<(String, Intent), SyncError> {
        match event.kind {
            MutationKind::Created | MutationKind::Updated => {
                let document = self.transformer.transform(definition, event.entity.as_ref())?;
                Ok((document.id().to_string(), Intent::Upsert(document)))
            }
            MutationKind::Deleted => {
                let id = self
                    .transformer
                    .document_id(definition, event.entity.as_ref())?;
                Ok((id, Intent::Delete))
            }
        }
    }

    /// Execute every staged intent and close the unit of work.
    ///
    /// Failures are logged and counted; they never stop the remaining
    /// intents. A delete of a document the engine does not have counts as
    /// done.
    #[instrument(skip(self))]
    pub async fn flush(&self) -> ImportResult {
        let (intents, mut result) = {
            let mut staging = self.staging.lock().await;
            staging.state = IndexerState::Flushing;
            (
                std::mem::take(&mut staging.intents),
                std::mem::take(&mut staging.rejected),
            )
        };

        for ((index_name, document_id), intent) in intents {
            let outcome = match &intent {
                Intent::Upsert(document) => self.documents.upsert(&index_name, document).await,
                Intent::Delete => match self.documents.delete(&index_name, &document_id).await {
                    Err(e) if e.is_not_found() => {
                        debug!(index = %index_name, document_id = %document_id, "Document already absent");
                        Ok(())
                    }
                    other => other,
                },
            };

            match outcome {
                Ok(()) => result.record_success(),
                Err(e) => {
                    warn!(
                        index = %index_name,
                        document_id = %document_id,
                        error = %e,
                        "Failed to apply staged change"
                    );
                    result.record_failure(format!(
                        "{}: document {}: {}",
                        index_name, document_id, e
                    ));
                }
            }
        }

        let mut staging = self.staging.lock().await;
        staging.state = if staging.intents.is_empty() {
            IndexerState::Idle
        } else {
            IndexerState::Collecting
        };

        if result.submitted > 0 {
            info!(
                succeeded = result.succeeded,
                failed = result.failed(),
                "Flushed staged changes"
            );
        }
        result
    }
}

#[async_trait]
impl MutationObserver for ChangeIndexer {
    async fn on_mutation(&self, event: &MutationEvent) {
        self.stage(event).await;
    }

    async fn on_flush(&self) {
        self.flush().await;
    }
}
