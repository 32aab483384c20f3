//! Dependency initialization and wiring for search sync.

use std::sync::Arc;

use tracing::info;

use super::{load_definitions, SyncConfig};
use crate::AppError;
use search_sync_pipeline::{
    CollectionRegistry, DocumentManager, DocumentManagerConfig, MutationBus, SyncService,
};
use search_sync_repository::{
    IndexSettings, InstrumentedClient, JsonLinesSource, NullClient, OpenSearchClient,
    SearchEngineClient,
};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Front-end operations over the configured engine and data directory.
    pub service: SyncService,
    /// Notification bus with the change-driven indexer subscribed.
    ///
    /// The CLI never publishes to it; it is the hook an embedding data
    /// layer uses to push mutations and flush them at commit.
    pub bus: MutationBus,
}

impl Dependencies {
    /// Initialize all dependencies from `config`.
    ///
    /// Loads and validates the collections file, connects to OpenSearch
    /// and verifies the cluster is healthy. An `OPENSEARCH_URL` of `null`
    /// selects [`NullClient`] and skips the health check.
    pub async fn new(config: &SyncConfig) -> Result<Self, AppError> {
        info!(
            opensearch_url = %config.opensearch_url,
            collections_config = %config.collections_config.display(),
            data_dir = %config.data_dir.display(),
            "Initializing dependencies"
        );

        let definitions =
            load_definitions(&config.collections_config, config.collection_prefix.as_deref())?;
        let registry = Arc::new(CollectionRegistry::new(definitions)?);

        info!(collections = registry.len(), "Collection definitions loaded");

        let client = engine_client(&config.opensearch_url).await?;
        let source = Arc::new(JsonLinesSource::new(config.data_dir.clone()));
        let documents = Arc::new(DocumentManager::with_config(
            client.clone(),
            DocumentManagerConfig {
                max_batch_size: Some(config.max_batch_size),
            },
        ));

        let service = SyncService::new(registry, client, source, documents);

        let bus = MutationBus::new();
        bus.subscribe(Arc::new(service.change_indexer())).await;

        Ok(Self { service, bus })
    }
}

async fn engine_client(url: &str) -> Result<Arc<dyn SearchEngineClient>, AppError> {
    if NullClient::is_null_url(url) {
        info!("Search engine disabled, running with the null client");
        let client: Arc<dyn SearchEngineClient> =
            Arc::new(InstrumentedClient::new(NullClient::new()));
        return Ok(client);
    }

    let search_client = OpenSearchClient::new(url, IndexSettings::default())
        .await
        .map_err(|e| AppError::config(format!("Failed to create OpenSearch client: {}", e)))?;

    let healthy = search_client
        .health_check()
        .await
        .map_err(|e| AppError::config(format!("OpenSearch health check failed: {}", e)))?;

    if !healthy {
        return Err(AppError::config("OpenSearch cluster is unhealthy"));
    }

    info!("OpenSearch connection verified");

    let client: Arc<dyn SearchEngineClient> = Arc::new(InstrumentedClient::new(search_client));
    Ok(client)
}
