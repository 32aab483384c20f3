//! Index schema as submitted to the search engine.

use serde::Serialize;

/// Engine-native field type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchemaFieldType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "string[]")]
    StringArray,
    #[serde(rename = "int32")]
    Int32,
    #[serde(rename = "int64")]
    Int64,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "object[]")]
    ObjectArray,
}

impl SchemaFieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::StringArray => "string[]",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Object => "object",
            Self::ObjectArray => "object[]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: SchemaFieldType,
    pub optional: bool,
    pub facet: bool,
    pub sort: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<SchemaField>,
}

/// The ordered, typed field list of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSchema {
    pub name: String,
    pub fields: Vec<SchemaField>,
    pub default_sorting_field: String,
    pub enable_nested_fields: bool,
}

impl IndexSchema {
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|field| field.name == name)
    }
}
