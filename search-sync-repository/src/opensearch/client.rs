//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cat::CatIndicesParts,
    cluster::ClusterHealthParts,
    http::{
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesGetParts},
    BulkParts, CountParts, DeleteParts, IndexParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::opensearch::index_config::{index_body, IndexSettings};
use crate::types::{CollectionInfo, DocumentOutcome, ImportAction};
use search_sync_shared::{Document, IndexSchema};

/// OpenSearch client implementation.
///
/// Each collection maps to one OpenSearch index; documents are addressed by
/// their primary key as `_id`.
///
/// # Example
///
/// ```ignore
/// let client = OpenSearchClient::new("http://localhost:9200", IndexSettings::default()).await?;
/// client.create_collection(&schema).await?;
/// client.upsert_document("books", &document).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    settings: IndexSettings,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `settings` - Shard layout for indexes created by this client
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If connection setup fails
    pub async fn new(url: &str, settings: IndexSettings) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            shards = settings.number_of_shards,
            replicas = settings.number_of_replicas,
            "Created OpenSearch client"
        );

        Ok(Self { client, settings })
    }

    async fn error_body(response: Response) -> String {
        response.text().await.unwrap_or_default()
    }

    async fn document_count(&self, index_name: &str) -> Option<u64> {
        let response = self
            .client
            .count(CountParts::Index(&[index_name]))
            .send()
            .await
            .ok()?;
        if !response.status_code().is_success() {
            return None;
        }
        let body: Value = response.json().await.ok()?;
        body["count"].as_u64()
    }
}

/// Build the NDJSON lines of a bulk request.
fn bulk_lines(documents: &[Document], action: ImportAction) -> Vec<Value> {
    let mut lines = Vec::with_capacity(documents.len() * 2);
    for document in documents {
        match action {
            ImportAction::Create => {
                lines.push(json!({ "create": { "_id": document.id() } }));
                lines.push(document.to_json());
            }
            ImportAction::Upsert => {
                lines.push(json!({ "index": { "_id": document.id() } }));
                lines.push(document.to_json());
            }
            ImportAction::Update => {
                lines.push(json!({ "update": { "_id": document.id() } }));
                lines.push(json!({ "doc": document.to_json() }));
            }
        }
    }
    lines
}

/// Map the `items` of a bulk response back onto the submitted documents.
fn parse_bulk_items(
    documents: &[Document],
    body: &Value,
) -> Result<Vec<DocumentOutcome>, SearchError> {
    let items = body["items"]
        .as_array()
        .ok_or_else(|| SearchError::parse("bulk response has no items"))?;

    if items.len() != documents.len() {
        return Err(SearchError::parse(format!(
            "bulk response has {} items for {} documents",
            items.len(),
            documents.len()
        )));
    }

    let outcomes = documents
        .iter()
        .zip(items)
        .map(|(document, item)| {
            // Each item is a single-key object: {"index": {...}} / {"create": {...}} / ...
            let result = item
                .as_object()
                .and_then(|op| op.values().next())
                .cloned()
                .unwrap_or(Value::Null);

            let status = result["status"].as_u64().unwrap_or(0);
            if (200..300).contains(&status) {
                DocumentOutcome::accepted(document.id())
            } else {
                let reason = result["error"]["reason"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("status {}: {}", status, result["error"]));
                DocumentOutcome::rejected(document.id(), reason)
            }
        })
        .collect();

    Ok(outcomes)
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    #[instrument(skip(self, schema), fields(index = %schema.name))]
    async fn create_collection(&self, schema: &IndexSchema) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&schema.name))
            .body(index_body(schema, &self.settings))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            debug!("Index created");
            return Ok(());
        }

        let error_body = Self::error_body(response).await;
        if error_body.contains("resource_already_exists_exception") {
            return Err(SearchError::already_exists(schema.name.clone()));
        }

        error!(status = %status, body = %error_body, "Create index request failed");
        Err(SearchError::index_creation(format!(
            "Create index failed with status {}: {}",
            status, error_body
        )))
    }

    #[instrument(skip(self))]
    async fn delete_collection(&self, index_name: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index_name]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(SearchError::not_found(index_name.to_string()));
        }
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Delete index request failed");
            return Err(SearchError::delete(format!(
                "Delete index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!("Index deleted");
        Ok(())
    }

    async fn describe_collection(&self, index_name: &str) -> Result<CollectionInfo, SearchError> {
        let response = self
            .client
            .indices()
            .get(IndicesGetParts::Index(&[index_name]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(SearchError::not_found(index_name.to_string()));
        }
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            return Err(SearchError::parse(format!(
                "Get index failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        Ok(CollectionInfo {
            name: index_name.to_string(),
            num_documents: self.document_count(index_name).await,
            details: body[index_name].clone(),
        })
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, SearchError> {
        let response = self
            .client
            .cat()
            .indices(CatIndicesParts::None)
            .format("json")
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            return Err(SearchError::parse(format!(
                "List indices failed with status {}: {}",
                status, error_body
            )));
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let name = row["index"].as_str()?.to_string();
                // Skip system indices such as `.opendistro-*`.
                if name.starts_with('.') {
                    return None;
                }
                let num_documents = row["docs.count"].as_str().and_then(|c| c.parse().ok());
                Some(CollectionInfo {
                    name,
                    num_documents,
                    details: row,
                })
            })
            .collect())
    }

    #[instrument(skip(self, document), fields(doc_id = %document.id()))]
    async fn upsert_document(
        &self,
        index_name: &str,
        document: &Document,
    ) -> Result<(), SearchError> {
        let response = self
            .client
            .index(IndexParts::IndexId(index_name, document.id()))
            .body(document.to_json())
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(SearchError::index(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!("Document indexed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_document(
        &self,
        index_name: &str,
        document_id: &str,
    ) -> Result<(), SearchError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index_name, document_id))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(SearchError::not_found(format!(
                "{}/{}",
                index_name, document_id
            )));
        }
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Delete request failed");
            return Err(SearchError::delete(format!(
                "Delete failed with status {}: {}",
                status, error_body
            )));
        }

        debug!("Document deleted");
        Ok(())
    }

    #[instrument(skip(self, documents), fields(count = documents.len(), action = %action))]
    async fn import_documents(
        &self,
        index_name: &str,
        documents: &[Document],
        action: ImportAction,
    ) -> Result<Vec<DocumentOutcome>, SearchError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let body: Vec<JsonBody<Value>> = bulk_lines(documents, action)
            .into_iter()
            .map(JsonBody::from)
            .collect();

        let response = self
            .client
            .bulk(BulkParts::Index(index_name))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchError::bulk_index(format!(
                "Bulk failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        parse_bulk_items(documents, &body)
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        Ok(matches!(body["status"].as_str(), Some("green") | Some("yellow")))
    }
}
