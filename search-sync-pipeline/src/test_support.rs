//! Shared mocks for unit tests.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use search_sync_repository::{
    CollectionInfo, DocumentOutcome, ImportAction, RecordSource, SearchEngineClient, SearchError,
    SourceError,
};
use search_sync_shared::{
    CollectionDefinition, Document, FieldDefinition, FieldType, IndexSchema, Record,
};

/// Books collection used across the pipeline tests.
pub fn books_definition() -> CollectionDefinition {
    CollectionDefinition {
        name: "books".to_string(),
        index_name: "test_books".to_string(),
        source_type: "book".to_string(),
        fields: vec![
            FieldDefinition::new("id", FieldType::Primary, "id"),
            FieldDefinition::new("sortable_id", FieldType::Int32, "id"),
            FieldDefinition::new("title", FieldType::String, "title"),
            FieldDefinition::new("author_country", FieldType::String, "author.country")
                .optional(),
        ],
        default_sorting_field: "sortable_id".to_string(),
    }
}

pub fn authors_definition() -> CollectionDefinition {
    CollectionDefinition {
        name: "authors".to_string(),
        index_name: "test_authors".to_string(),
        source_type: "author".to_string(),
        fields: vec![
            FieldDefinition::new("id", FieldType::Primary, "id"),
            FieldDefinition::new("sortable_id", FieldType::Int64, "id"),
            FieldDefinition::new("name", FieldType::String, "name"),
        ],
        default_sorting_field: "sortable_id".to_string(),
    }
}

pub fn book(id: i64, title: &str) -> Arc<dyn Record> {
    Arc::new(json!({"id": id, "title": title, "author": null}))
}

/// In-memory engine that records every call it receives.
#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<String>>,
    indexes: Mutex<BTreeMap<String, BTreeMap<String, Document>>>,
    rejected_ids: Mutex<HashSet<String>>,
    fail_imports: AtomicBool,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(prefix))
            .collect()
    }

    pub fn reject(&self, document_id: &str) {
        self.rejected_ids
            .lock()
            .unwrap()
            .insert(document_id.to_string());
    }

    pub fn fail_imports(&self) {
        self.fail_imports.store(true, Ordering::SeqCst);
    }

    pub fn ids(&self, index_name: &str) -> Vec<String> {
        self.indexes
            .lock()
            .unwrap()
            .get(index_name)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn document(&self, index_name: &str, id: &str) -> Option<Document> {
        self.indexes
            .lock()
            .unwrap()
            .get(index_name)
            .and_then(|docs| docs.get(id).cloned())
    }

    pub fn seed(&self, index_name: &str, document: Document) {
        self.indexes
            .lock()
            .unwrap()
            .entry(index_name.to_string())
            .or_default()
            .insert(document.id().to_string(), document);
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn is_rejected(&self, id: &str) -> bool {
        self.rejected_ids.lock().unwrap().contains(id)
    }
}

#[async_trait]
impl SearchEngineClient for RecordingClient {
    async fn create_collection(&self, schema: &IndexSchema) -> Result<(), SearchError> {
        self.log(format!("create_collection {}", schema.name));
        let mut indexes = self.indexes.lock().unwrap();
        if indexes.contains_key(&schema.name) {
            return Err(SearchError::already_exists(&schema.name));
        }
        indexes.insert(schema.name.clone(), BTreeMap::new());
        Ok(())
    }

    async fn delete_collection(&self, index_name: &str) -> Result<(), SearchError> {
        self.log(format!("delete_collection {}", index_name));
        match self.indexes.lock().unwrap().remove(index_name) {
            Some(_) => Ok(()),
            None => Err(SearchError::not_found(index_name)),
        }
    }

    async fn describe_collection(&self, index_name: &str) -> Result<CollectionInfo, SearchError> {
        self.log(format!("describe_collection {}", index_name));
        let indexes = self.indexes.lock().unwrap();
        let docs = indexes
            .get(index_name)
            .ok_or_else(|| SearchError::not_found(index_name))?;
        Ok(CollectionInfo {
            name: index_name.to_string(),
            num_documents: Some(docs.len() as u64),
            details: Value::Null,
        })
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, SearchError> {
        self.log("list_collections".to_string());
        Ok(self
            .indexes
            .lock()
            .unwrap()
            .iter()
            .map(|(name, docs)| CollectionInfo {
                name: name.clone(),
                num_documents: Some(docs.len() as u64),
                details: Value::Null,
            })
            .collect())
    }

    async fn upsert_document(
        &self,
        index_name: &str,
        document: &Document,
    ) -> Result<(), SearchError> {
        self.log(format!("upsert_document {} {}", index_name, document.id()));
        if self.is_rejected(document.id()) {
            return Err(SearchError::index(format!("rejected {}", document.id())));
        }
        let mut indexes = self.indexes.lock().unwrap();
        let docs = indexes
            .get_mut(index_name)
            .ok_or_else(|| SearchError::not_found(index_name))?;
        docs.insert(document.id().to_string(), document.clone());
        Ok(())
    }

    async fn delete_document(
        &self,
        index_name: &str,
        document_id: &str,
    ) -> Result<(), SearchError> {
        self.log(format!("delete_document {} {}", index_name, document_id));
        let mut indexes = self.indexes.lock().unwrap();
        let docs = indexes
            .get_mut(index_name)
            .ok_or_else(|| SearchError::not_found(index_name))?;
        match docs.remove(document_id) {
            Some(_) => Ok(()),
            None => Err(SearchError::not_found(document_id)),
        }
    }

    async fn import_documents(
        &self,
        index_name: &str,
        documents: &[Document],
        action: ImportAction,
    ) -> Result<Vec<DocumentOutcome>, SearchError> {
        self.log(format!("import_documents {} {}", index_name, documents.len()));
        if self.fail_imports.load(Ordering::SeqCst) {
            return Err(SearchError::connection("connection refused"));
        }

        let mut indexes = self.indexes.lock().unwrap();
        let docs = indexes
            .get_mut(index_name)
            .ok_or_else(|| SearchError::not_found(index_name))?;

        Ok(documents
            .iter()
            .map(|doc| {
                if self.is_rejected(doc.id()) {
                    DocumentOutcome::rejected(doc.id(), "mapper_parsing_exception")
                } else if action == ImportAction::Create && docs.contains_key(doc.id()) {
                    DocumentOutcome::rejected(doc.id(), "version_conflict_engine_exception")
                } else if action == ImportAction::Update && !docs.contains_key(doc.id()) {
                    DocumentOutcome::rejected(doc.id(), "document_missing_exception")
                } else {
                    docs.insert(doc.id().to_string(), doc.clone());
                    DocumentOutcome::accepted(doc.id())
                }
            })
            .collect())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        self.log("health_check".to_string());
        Ok(true)
    }
}

/// Record source over in-memory vectors, logging each fetch window.
#[derive(Default)]
pub struct VecSource {
    records: BTreeMap<String, Vec<Arc<dyn Record>>>,
    fetches: Mutex<VecDeque<(u64, usize)>>,
}

impl VecSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source_type: &str, records: Vec<Arc<dyn Record>>) -> Self {
        self.records.insert(source_type.to_string(), records);
        self
    }

    pub fn fetches(&self) -> Vec<(u64, usize)> {
        self.fetches.lock().unwrap().iter().copied().collect()
    }
}

#[async_trait]
impl RecordSource for VecSource {
    async fn count(&self, source_type: &str) -> Result<u64, SourceError> {
        self.records
            .get(source_type)
            .map(|records| records.len() as u64)
            .ok_or_else(|| SourceError::UnknownSourceType(source_type.to_string()))
    }

    async fn fetch(
        &self,
        source_type: &str,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<Arc<dyn Record>>, SourceError> {
        self.fetches.lock().unwrap().push_back((offset, limit));
        let records = self
            .records
            .get(source_type)
            .ok_or_else(|| SourceError::UnknownSourceType(source_type.to_string()))?;
        Ok(records
            .iter()
            .skip(offset as usize)
            .take(limit)
            .cloned()
            .collect())
    }
}
