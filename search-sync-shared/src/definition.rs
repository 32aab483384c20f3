//! Declarative collection definitions.

use serde::{Deserialize, Serialize};

/// The kind of value a field holds once indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Unique document identifier, always indexed as a string.
    #[serde(rename = "primary")]
    Primary,
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
    /// Point in time, indexed as epoch seconds.
    #[serde(rename = "datetime")]
    Datetime,
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "object[]")]
    ObjectArray,
}

impl FieldType {
    /// Whether values of this type can back a default sort.
    pub fn is_sortable_numeric(self) -> bool {
        matches!(self, Self::Int32 | Self::Int64 | Self::Float)
    }

    pub fn is_object(self) -> bool {
        matches!(self, Self::Object | Self::ObjectArray)
    }
}

/// One output field of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Field name in the index.
    pub name: String,
    pub field_type: FieldType,
    /// Dotted path into the source record, e.g. `author.country`.
    pub source_attribute: String,
    /// Omit the field instead of failing when the source value is missing.
    pub optional: bool,
    pub facet: bool,
    pub sort: bool,
    /// Sub-schema for `object` fields. Empty means the value is opaque.
    pub fields: Vec<FieldDefinition>,
}

impl FieldDefinition {
    pub fn new(
        name: impl Into<String>,
        field_type: FieldType,
        source_attribute: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type,
            source_attribute: source_attribute.into(),
            optional: false,
            facet: false,
            sort: false,
            fields: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn faceted(mut self) -> Self {
        self.facet = true;
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldDefinition>) -> Self {
        self.fields = fields;
        self
    }
}

/// How one collection is populated from one source type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDefinition {
    /// Logical name, unique among definitions.
    pub name: String,
    /// Name used in the search engine, prefix included.
    pub index_name: String,
    /// Entity type the collection is populated from.
    pub source_type: String,
    /// Ordered fields; order defines the schema field order.
    pub fields: Vec<FieldDefinition>,
    pub default_sorting_field: String,
}

impl CollectionDefinition {
    /// The single `primary` field, if the definition has one.
    pub fn primary_field(&self) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|field| field.field_type == FieldType::Primary)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }
}
