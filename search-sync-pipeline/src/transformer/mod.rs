//! Schema transformer.
//!
//! Turns a collection definition into an index schema, and a source record
//! into a flat document that matches that schema.

use chrono::{DateTime, SecondsFormat};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::errors::SyncError;
use crate::resolver::{PathResolver, Resolved};
use search_sync_shared::{
    CollectionDefinition, Document, FieldDefinition, FieldType, FieldValue, IndexSchema, Record,
    SchemaField, SchemaFieldType,
};

/// Engine type tag for a definition type.
pub fn schema_type(field_type: FieldType) -> SchemaFieldType {
    match field_type {
        FieldType::Primary | FieldType::String => SchemaFieldType::String,
        FieldType::StringArray => SchemaFieldType::StringArray,
        FieldType::Int32 => SchemaFieldType::Int32,
        FieldType::Int64 | FieldType::Datetime => SchemaFieldType::Int64,
        FieldType::Float => SchemaFieldType::Float,
        FieldType::Bool => SchemaFieldType::Bool,
        FieldType::Object => SchemaFieldType::Object,
        FieldType::ObjectArray => SchemaFieldType::ObjectArray,
    }
}

fn schema_field(field: &FieldDefinition, default_sorting_field: Option<&str>) -> SchemaField {
    let nested = if field.field_type.is_object() {
        field
            .fields
            .iter()
            .map(|child| schema_field(child, None))
            .collect()
    } else {
        Vec::new()
    };

    SchemaField {
        name: field.name.clone(),
        field_type: schema_type(field.field_type),
        optional: field.optional && field.field_type != FieldType::Primary,
        facet: field.facet,
        sort: field.sort || default_sorting_field == Some(field.name.as_str()),
        fields: nested,
    }
}

/// Maps records onto collection schemas.
#[derive(Default)]
pub struct SchemaTransformer {
    resolver: PathResolver,
}

impl SchemaTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    /// Derive the index schema of a collection.
    pub fn build_schema(&self, definition: &CollectionDefinition) -> IndexSchema {
        let default_sort = definition.default_sorting_field.as_str();
        IndexSchema {
            name: definition.index_name.clone(),
            fields: definition
                .fields
                .iter()
                .map(|field| schema_field(field, Some(default_sort)))
                .collect(),
            default_sorting_field: definition.default_sorting_field.clone(),
            enable_nested_fields: definition
                .fields
                .iter()
                .any(|field| field.field_type.is_object()),
        }
    }

    /// Transform one record into a document of `definition`.
    ///
    /// # Errors
    ///
    /// `SyncError::Schema` when a required field is missing or null, when a
    /// value cannot be coerced to its field type, or when the definition has
    /// no primary field.
    #[instrument(skip(self, definition, record), fields(collection = %definition.name))]
    pub fn transform(
        &self,
        definition: &CollectionDefinition,
        record: &dyn Record,
    ) -> Result<Document, SyncError> {
        let mut fields = Map::new();
        let id = self.fill(&definition.name, None, &definition.fields, record, &mut fields)?;

        let id = id.ok_or_else(|| {
            SyncError::schema(&definition.name, "<primary>", "definition has no primary field")
        })?;

        Ok(Document::new(id, fields))
    }

    /// Resolve only the primary key of `record`.
    pub fn document_id(
        &self,
        definition: &CollectionDefinition,
        record: &dyn Record,
    ) -> Result<String, SyncError> {
        let primary = definition.primary_field().ok_or_else(|| {
            SyncError::schema(&definition.name, "<primary>", "definition has no primary field")
        })?;

        let resolved = self.resolver.resolve(record, &primary.source_attribute);
        match self.convert(&definition.name, &primary.name, primary, resolved)? {
            Some(Value::String(id)) => Ok(id),
            _ => Err(SyncError::schema(
                &definition.name,
                &primary.name,
                "primary key did not resolve to a string",
            )),
        }
    }

    /// Write every field of `definitions` into `out`, returning the primary
    /// key if one of them is the primary field.
    fn fill(
        &self,
        collection: &str,
        prefix: Option<&str>,
        definitions: &[FieldDefinition],
        record: &dyn Record,
        out: &mut Map<String, Value>,
    ) -> Result<Option<String>, SyncError> {
        let mut id = None;

        for field in definitions {
            let label = match prefix {
                Some(prefix) => format!("{}.{}", prefix, field.name),
                None => field.name.clone(),
            };

            let resolved = self.resolver.resolve(record, &field.source_attribute);
            let Some(value) = self.convert(collection, &label, field, resolved)? else {
                continue;
            };

            if field.field_type == FieldType::Primary && prefix.is_none() {
                if let Value::String(key) = &value {
                    id = Some(key.clone());
                }
            }
            out.insert(field.name.clone(), value);
        }

        Ok(id)
    }

    /// Convert one resolved value to its indexed form.
    ///
    /// `Ok(None)` means the field is optional and has no value.
    fn convert(
        &self,
        collection: &str,
        label: &str,
        field: &FieldDefinition,
        resolved: Resolved,
    ) -> Result<Option<Value>, SyncError> {
        let was_missing = resolved.is_missing();
        let Some(value) = resolved.into_present() else {
            if field.optional && field.field_type != FieldType::Primary {
                return Ok(None);
            }
            let reason = if was_missing {
                format!("source attribute '{}' is missing", field.source_attribute)
            } else {
                format!("source attribute '{}' is null", field.source_attribute)
            };
            return Err(SyncError::schema(collection, label, reason));
        };

        let mismatch = |expected: &str, value: &FieldValue| {
            SyncError::schema(
                collection,
                label,
                format!("expected {}, got {}", expected, value.kind()),
            )
        };

        let converted = match field.field_type {
            FieldType::Primary => match scalar_text(&value) {
                Some(text) => Value::String(text),
                None => return Err(mismatch("a scalar primary key", &value)),
            },
            FieldType::String => match string_text(&value) {
                Some(text) => Value::String(text),
                None => return Err(mismatch("string", &value)),
            },
            FieldType::StringArray => match &value {
                FieldValue::List(items) => {
                    let mut texts = Vec::with_capacity(items.len());
                    for item in items {
                        match string_text(item) {
                            Some(text) => texts.push(Value::String(text)),
                            None => return Err(mismatch("list of strings", item)),
                        }
                    }
                    Value::Array(texts)
                }
                single => match string_text(single) {
                    Some(text) => Value::Array(vec![Value::String(text)]),
                    None => return Err(mismatch("list of strings", single)),
                },
            },
            FieldType::Int32 => match as_i64(&value).and_then(|i| i32::try_from(i).ok()) {
                Some(i) => Value::from(i),
                None => return Err(mismatch("int32", &value)),
            },
            FieldType::Int64 => match as_i64(&value) {
                Some(i) => Value::from(i),
                None => return Err(mismatch("int64", &value)),
            },
            FieldType::Float => match as_f64(&value).and_then(serde_json::Number::from_f64) {
                Some(n) => Value::Number(n),
                None => return Err(mismatch("float", &value)),
            },
            FieldType::Bool => match &value {
                FieldValue::Bool(b) => Value::Bool(*b),
                FieldValue::String(s) if s == "true" => Value::Bool(true),
                FieldValue::String(s) if s == "false" => Value::Bool(false),
                other => return Err(mismatch("bool", other)),
            },
            FieldType::Datetime => match &value {
                FieldValue::DateTime(dt) => Value::from(dt.timestamp()),
                FieldValue::Int(seconds) => Value::from(*seconds),
                FieldValue::String(s) => match DateTime::parse_from_rfc3339(s) {
                    Ok(dt) => Value::from(dt.timestamp()),
                    Err(_) => return Err(mismatch("RFC 3339 datetime", &value)),
                },
                other => return Err(mismatch("datetime", other)),
            },
            FieldType::Object => {
                if field.fields.is_empty() {
                    value.to_json()
                } else {
                    match &value {
                        FieldValue::Object(nested) => {
                            let mut map = Map::new();
                            self.fill(collection, Some(label), &field.fields, nested.as_ref(), &mut map)?;
                            Value::Object(map)
                        }
                        other => return Err(mismatch("object", other)),
                    }
                }
            }
            FieldType::ObjectArray => {
                let items = match value {
                    FieldValue::List(items) => items,
                    FieldValue::Object(nested) => vec![FieldValue::Object(nested)],
                    other => return Err(mismatch("list of objects", &other)),
                };
                let mut objects = Vec::with_capacity(items.len());
                for item in &items {
                    match item {
                        FieldValue::Object(nested) if !field.fields.is_empty() => {
                            let mut map = Map::new();
                            self.fill(collection, Some(label), &field.fields, nested.as_ref(), &mut map)?;
                            objects.push(Value::Object(map));
                        }
                        FieldValue::Object(_) => objects.push(item.to_json()),
                        other => return Err(mismatch("list of objects", other)),
                    }
                }
                Value::Array(objects)
            }
        };

        Ok(Some(converted))
    }
}

fn scalar_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::String(s) => Some(s.clone()),
        FieldValue::Int(i) => Some(i.to_string()),
        FieldValue::Float(f) => Some(f.to_string()),
        FieldValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::DateTime(dt) => Some(dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
        other => scalar_text(other),
    }
}

fn as_i64(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Int(i) => Some(*i),
        FieldValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Int(i) => Some(*i as f64),
        FieldValue::Float(f) => Some(*f),
        FieldValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
