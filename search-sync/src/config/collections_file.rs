//! Collections file parsing.
//!
//! The file lists every collection with its source type and fields. Index
//! names default to `prefix + name`, source attributes to the field name.

use std::path::Path;

use serde::Deserialize;

use crate::AppError;
use search_sync_shared::{CollectionDefinition, FieldDefinition, FieldType};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CollectionsFile {
    #[serde(default)]
    collection_prefix: Option<String>,
    collections: Vec<CollectionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CollectionEntry {
    name: String,
    #[serde(default)]
    index_name: Option<String>,
    source_type: String,
    default_sorting_field: String,
    fields: Vec<FieldEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldEntry {
    name: String,
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(default)]
    source_attribute: Option<String>,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    facet: bool,
    #[serde(default)]
    sort: bool,
    #[serde(default)]
    fields: Vec<FieldEntry>,
}

impl FieldEntry {
    fn into_definition(self) -> FieldDefinition {
        let source_attribute = self.source_attribute.unwrap_or_else(|| self.name.clone());
        FieldDefinition {
            name: self.name,
            field_type: self.field_type,
            source_attribute,
            optional: self.optional,
            facet: self.facet,
            sort: self.sort,
            fields: self
                .fields
                .into_iter()
                .map(FieldEntry::into_definition)
                .collect(),
        }
    }
}

/// Read collection definitions from `path`.
///
/// `prefix_override` replaces the file's `collection_prefix` when set.
pub fn load_definitions(
    path: &Path,
    prefix_override: Option<&str>,
) -> Result<Vec<CollectionDefinition>, AppError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        AppError::config(format!("Cannot read collections file {}: {}", path.display(), e))
    })?;
    parse_definitions(&text, prefix_override).map_err(|e| match e {
        AppError::ConfigParseError { source, .. } => AppError::ConfigParseError {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })
}

/// Parse collection definitions from the JSON text of a collections file.
pub fn parse_definitions(
    text: &str,
    prefix_override: Option<&str>,
) -> Result<Vec<CollectionDefinition>, AppError> {
    let file: CollectionsFile =
        serde_json::from_str(text).map_err(|source| AppError::ConfigParseError {
            path: "<inline>".to_string(),
            source,
        })?;

    let prefix = prefix_override
        .map(str::to_string)
        .or(file.collection_prefix)
        .unwrap_or_default();

    Ok(file
        .collections
        .into_iter()
        .map(|entry| CollectionDefinition {
            index_name: entry
                .index_name
                .unwrap_or_else(|| format!("{}{}", prefix, entry.name)),
            name: entry.name,
            source_type: entry.source_type,
            default_sorting_field: entry.default_sorting_field,
            fields: entry
                .fields
                .into_iter()
                .map(FieldEntry::into_definition)
                .collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BOOKS: &str = r#"{
        "collection_prefix": "acme_",
        "collections": [
            {
                "name": "books",
                "source_type": "book",
                "default_sorting_field": "sortable_id",
                "fields": [
                    {"name": "id", "type": "primary"},
                    {"name": "sortable_id", "type": "int32", "source_attribute": "id"},
                    {"name": "title", "type": "string"},
                    {"name": "genres", "type": "string[]", "facet": true, "optional": true},
                    {"name": "author_country", "type": "string", "source_attribute": "author.country", "optional": true},
                    {"name": "author", "type": "object", "optional": true, "fields": [
                        {"name": "name", "type": "string"}
                    ]}
                ]
            },
            {
                "name": "authors",
                "index_name": "people",
                "source_type": "author",
                "default_sorting_field": "sortable_id",
                "fields": [
                    {"name": "id", "type": "primary"},
                    {"name": "sortable_id", "type": "int64", "source_attribute": "id"}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_defaults_and_prefix() {
        let definitions = parse_definitions(BOOKS, None).unwrap();

        assert_eq!(definitions.len(), 2);
        let books = &definitions[0];
        assert_eq!(books.index_name, "acme_books");
        assert_eq!(books.field("title").unwrap().source_attribute, "title");
        assert_eq!(
            books.field("author_country").unwrap().source_attribute,
            "author.country"
        );
        assert!(books.field("genres").unwrap().facet);
        assert_eq!(books.field("genres").unwrap().field_type, FieldType::StringArray);
        assert_eq!(books.field("author").unwrap().fields[0].source_attribute, "name");

        assert_eq!(definitions[1].index_name, "people");
    }

    #[test]
    fn test_prefix_override() {
        let definitions = parse_definitions(BOOKS, Some("test_")).unwrap();
        assert_eq!(definitions[0].index_name, "test_books");
        assert_eq!(definitions[1].index_name, "people");
    }

    #[test]
    fn test_rejects_unknown_type_and_keys() {
        let bad_type = r#"{"collections": [{"name": "x", "source_type": "x",
            "default_sorting_field": "id", "fields": [{"name": "id", "type": "uuid"}]}]}"#;
        assert!(matches!(
            parse_definitions(bad_type, None),
            Err(AppError::ConfigParseError { .. })
        ));

        let bad_key = r#"{"collections": [], "colections": []}"#;
        assert!(parse_definitions(bad_key, None).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BOOKS.as_bytes()).unwrap();

        let definitions = load_definitions(file.path(), None).unwrap();
        assert_eq!(definitions[0].name, "books");

        let missing = load_definitions(Path::new("/nonexistent/collections.json"), None);
        assert!(matches!(missing, Err(AppError::ConfigError(_))));
    }
}
