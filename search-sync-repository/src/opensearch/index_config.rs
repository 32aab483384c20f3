//! OpenSearch index configuration and mappings.
//!
//! This module turns an engine-neutral [`IndexSchema`] into the settings
//! and mappings body of an OpenSearch create-index request.

use serde_json::{json, Map, Value};

use search_sync_shared::{IndexSchema, SchemaField, SchemaFieldType};

/// Shard layout applied to every index created by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSettings {
    pub number_of_shards: u32,
    pub number_of_replicas: u32,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            number_of_shards: 1,
            number_of_replicas: 1,
        }
    }
}

/// Build the create-index body for a schema.
///
/// The configuration includes:
/// - **text + raw keyword** for string fields, plain `keyword` for facets
/// - **numeric types** for `int32`/`int64`/`float`
/// - **object properties** for objects with a sub-schema; opaque objects
///   are stored but not indexed
/// - **strict dynamic mapping** so documents that do not match the schema
///   are rejected per document instead of silently widening the mapping
pub fn index_body(schema: &IndexSchema, settings: &IndexSettings) -> Value {
    json!({
        "settings": {
            "number_of_shards": settings.number_of_shards,
            "number_of_replicas": settings.number_of_replicas
        },
        "mappings": {
            "dynamic": "strict",
            "_meta": {
                "default_sorting_field": schema.default_sorting_field,
                "enable_nested_fields": schema.enable_nested_fields
            },
            "properties": properties(&schema.fields)
        }
    })
}

fn properties(fields: &[SchemaField]) -> Value {
    let mut map = Map::new();
    for field in fields {
        map.insert(field.name.clone(), field_mapping(field));
    }
    Value::Object(map)
}

fn field_mapping(field: &SchemaField) -> Value {
    match field.field_type {
        SchemaFieldType::String | SchemaFieldType::StringArray => {
            if field.facet || field.sort {
                json!({ "type": "keyword" })
            } else {
                json!({
                    "type": "text",
                    "fields": {
                        "raw": { "type": "keyword" }
                    }
                })
            }
        }
        SchemaFieldType::Int32 => json!({ "type": "integer" }),
        SchemaFieldType::Int64 => json!({ "type": "long" }),
        SchemaFieldType::Float => json!({ "type": "double" }),
        SchemaFieldType::Bool => json!({ "type": "boolean" }),
        SchemaFieldType::Object | SchemaFieldType::ObjectArray => {
            if field.fields.is_empty() {
                json!({ "type": "object", "enabled": false })
            } else {
                json!({
                    "type": "object",
                    "properties": properties(&field.fields)
                })
            }
        }
    }
}
