//! Bulk importer.
//!
//! Streams every record of a collection's source type in fixed-size pages,
//! transforms each page and submits it as one batch. Pages are processed
//! one at a time, so memory use is bounded by the page size.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::collections::CollectionRegistry;
use crate::documents::DocumentManager;
use crate::errors::SyncError;
use crate::transformer::SchemaTransformer;
use search_sync_repository::{ImportAction, RecordSource};
use search_sync_shared::{CollectionDefinition, ImportResult, Record};

pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Tuning for one import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Records fetched and submitted per batch.
    pub page_size: usize,
    /// First page to import, 1-based.
    pub first_page: usize,
    /// Last page to import, inclusive. `None` imports to the end.
    pub last_page: Option<usize>,
    pub action: ImportAction,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            first_page: 1,
            last_page: None,
            action: ImportAction::default(),
        }
    }
}

impl ImportOptions {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Check the options and return the record offset of the first page.
    fn start_offset(&self) -> Result<u64, SyncError> {
        if self.page_size == 0 {
            return Err(SyncError::invalid_options("page size must be at least 1"));
        }
        if self.first_page == 0 {
            return Err(SyncError::invalid_options("pages are numbered from 1"));
        }
        if let Some(last) = self.last_page {
            if last < self.first_page {
                return Err(SyncError::invalid_options(format!(
                    "last page {} is before first page {}",
                    last, self.first_page
                )));
            }
        }
        (self.first_page - 1)
            .checked_mul(self.page_size)
            .and_then(|offset| u64::try_from(offset).ok())
            .ok_or_else(|| {
                SyncError::invalid_options(format!(
                    "first page {} with page size {} is out of range",
                    self.first_page, self.page_size
                ))
            })
    }
}

/// Receives progress of an import run.
pub trait ImportProgress: Send + Sync {
    fn on_start(&self, collection: &str, total: u64);

    fn on_page(&self, collection: &str, page: usize, processed: u64, total: u64);
}

/// Progress reporter writing `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ImportProgress for LogProgress {
    fn on_start(&self, collection: &str, total: u64) {
        info!(collection, total, "Starting import");
    }

    fn on_page(&self, collection: &str, page: usize, processed: u64, total: u64) {
        info!(collection, page, processed, total, "Imported page");
    }
}

/// Full re-import of collections from the system of record.
pub struct BulkImporter {
    registry: Arc<CollectionRegistry>,
    transformer: Arc<SchemaTransformer>,
    source: Arc<dyn RecordSource>,
    documents: Arc<DocumentManager>,
    progress: Arc<dyn ImportProgress>,
}

impl BulkImporter {
    pub fn new(
        registry: Arc<CollectionRegistry>,
        transformer: Arc<SchemaTransformer>,
        source: Arc<dyn RecordSource>,
        documents: Arc<DocumentManager>,
    ) -> Self {
        Self {
            registry,
            transformer,
            source,
            documents,
            progress: Arc::new(LogProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ImportProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Import every record of collection `name`.
    ///
    /// Records that fail to transform and documents the engine rejects are
    /// recorded as failures. A page the engine refuses as a whole records
    /// one failure per document of that page and the import moves on. A
    /// page whose records all fail to transform sends no batch, so such a
    /// page does not count towards the engine submissions.
    ///
    /// # Errors
    ///
    /// `SyncError::UnknownCollection` for an unregistered name,
    /// `SyncError::InvalidOptions` for out-of-range options and
    /// `SyncError::Source` when the system of record cannot be read.
    #[instrument(skip(self, options), fields(page_size = options.page_size))]
    pub async fn import(
        &self,
        name: &str,
        options: &ImportOptions,
    ) -> Result<ImportResult, SyncError> {
        let definition = self.registry.get(name)?;
        let mut offset = options.start_offset()?;

        let total = self.source.count(&definition.source_type).await?;
        self.progress.on_start(name, total);

        let mut result = ImportResult::new();
        let mut page = options.first_page;
        let mut processed: u64 = 0;

        while offset < total && options.last_page.map_or(true, |last| page <= last) {
            let records = self
                .source
                .fetch(&definition.source_type, offset, options.page_size)
                .await?;
            if records.is_empty() {
                break;
            }

            let fetched = records.len();
            result.merge(self.import_page(&definition, &records, options.action).await);

            processed += fetched as u64;
            self.progress.on_page(name, page, processed, total);

            if fetched < options.page_size {
                break;
            }
            offset += fetched as u64;
            page += 1;
        }

        info!(
            collection = name,
            submitted = result.submitted,
            succeeded = result.succeeded,
            failed = result.failed(),
            "Import finished"
        );
        Ok(result)
    }

    async fn import_page(
        &self,
        definition: &CollectionDefinition,
        records: &[Arc<dyn Record>],
        action: ImportAction,
    ) -> ImportResult {
        let mut result = ImportResult::new();
        let mut documents = Vec::with_capacity(records.len());

        for record in records {
            match self.transformer.transform(definition, record.as_ref()) {
                Ok(document) => documents.push(document),
                Err(e) => {
                    let id = self
                        .transformer
                        .document_id(definition, record.as_ref())
                        .unwrap_or_else(|_| "<unknown>".to_string());
                    result.record_failure(format!("{}: record {}: {}", definition.name, id, e));
                }
            }
        }

        match self
            .documents
            .import_batch(&definition.index_name, &documents, action)
            .await
        {
            Ok(batch) => result.merge(batch),
            Err(e) => {
                warn!(
                    collection = %definition.name,
                    count = documents.len(),
                    error = %e,
                    "Batch submission failed"
                );
                for document in &documents {
                    result.record_failure(format!(
                        "{}: document {}: {}",
                        definition.name,
                        document.id(),
                        e
                    ));
                }
            }
        }

        result
    }
}
