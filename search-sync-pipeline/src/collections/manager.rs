use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, instrument};

use super::CollectionRegistry;
use crate::errors::SyncError;
use crate::transformer::SchemaTransformer;
use search_sync_repository::{CollectionInfo, SearchEngineClient};
use search_sync_shared::{CollectionDefinition, IndexSchema};

/// Creates and removes engine collections for registered definitions.
///
/// Engine errors are surfaced unchanged. In particular a not-found answer
/// to `delete_collection` is returned to the caller, who decides whether it
/// matters.
pub struct CollectionManager {
    client: Arc<dyn SearchEngineClient>,
    registry: Arc<CollectionRegistry>,
    transformer: Arc<SchemaTransformer>,
}

impl CollectionManager {
    pub fn new(
        client: Arc<dyn SearchEngineClient>,
        registry: Arc<CollectionRegistry>,
        transformer: Arc<SchemaTransformer>,
    ) -> Self {
        Self {
            client,
            registry,
            transformer,
        }
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    /// Create the engine collection for `name` and return its schema.
    ///
    /// # Errors
    ///
    /// `SyncError::UnknownCollection` before any engine call when `name`
    /// is not registered; `SyncError::Engine` when the engine refuses.
    #[instrument(skip(self))]
    pub async fn create_collection(&self, name: &str) -> Result<IndexSchema, SyncError> {
        let definition = self.registry.get(name)?;
        let schema = self.transformer.build_schema(&definition);

        self.client.create_collection(&schema).await?;

        info!(
            collection = name,
            index = %schema.name,
            fields = schema.fields.len(),
            "Created collection"
        );
        Ok(schema)
    }

    #[instrument(skip(self))]
    pub async fn delete_collection(&self, name: &str) -> Result<(), SyncError> {
        let definition = self.registry.get(name)?;

        self.client.delete_collection(&definition.index_name).await?;

        info!(collection = name, index = %definition.index_name, "Deleted collection");
        Ok(())
    }

    pub async fn describe_collection(&self, name: &str) -> Result<CollectionInfo, SyncError> {
        let definition = self.registry.get(name)?;
        Ok(self
            .client
            .describe_collection(&definition.index_name)
            .await?)
    }

    /// Every registered definition, by name.
    pub fn list_definitions(&self) -> &BTreeMap<String, Arc<CollectionDefinition>> {
        self.registry.definitions()
    }

    /// Collections that currently exist in the engine.
    pub async fn list_collections(&self) -> Result<Vec<CollectionInfo>, SyncError> {
        Ok(self.client.list_collections().await?)
    }
}
