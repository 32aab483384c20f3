//! Immutable registry of collection definitions.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::errors::SyncError;
use search_sync_shared::{CollectionDefinition, FieldType};

/// Collection definitions keyed by name.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    definitions: BTreeMap<String, Arc<CollectionDefinition>>,
}

impl CollectionRegistry {
    /// Validate and register `definitions`.
    ///
    /// # Errors
    ///
    /// `SyncError::InvalidDefinition` on a duplicate collection name or on
    /// any definition that fails [`validate`].
    pub fn new(definitions: Vec<CollectionDefinition>) -> Result<Self, SyncError> {
        let mut registered = BTreeMap::new();

        for definition in definitions {
            validate(&definition)?;
            if registered.contains_key(&definition.name) {
                return Err(SyncError::invalid_definition(format!(
                    "collection '{}' is defined twice",
                    definition.name
                )));
            }
            registered.insert(definition.name.clone(), Arc::new(definition));
        }

        Ok(Self {
            definitions: registered,
        })
    }

    pub fn get(&self, name: &str) -> Result<Arc<CollectionDefinition>, SyncError> {
        self.definitions
            .get(name)
            .cloned()
            .ok_or_else(|| SyncError::unknown_collection(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.definitions.keys().cloned().collect()
    }

    /// The full registry, by name.
    pub fn definitions(&self) -> &BTreeMap<String, Arc<CollectionDefinition>> {
        &self.definitions
    }

    /// Every collection populated from `source_type`.
    pub fn definitions_for_source(&self, source_type: &str) -> Vec<Arc<CollectionDefinition>> {
        self.definitions
            .values()
            .filter(|definition| definition.source_type == source_type)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Check one definition for internal consistency.
pub fn validate(definition: &CollectionDefinition) -> Result<(), SyncError> {
    let invalid = |reason: String| {
        SyncError::invalid_definition(format!("collection '{}': {}", definition.name, reason))
    };

    if definition.name.is_empty() {
        return Err(SyncError::invalid_definition("collection name is empty"));
    }
    if definition.index_name.is_empty() {
        return Err(invalid("index name is empty".to_string()));
    }

    let mut seen = HashSet::new();
    for field in &definition.fields {
        if !seen.insert(field.name.as_str()) {
            return Err(invalid(format!("field '{}' is defined twice", field.name)));
        }
    }

    let primaries: Vec<_> = definition
        .fields
        .iter()
        .filter(|field| field.field_type == FieldType::Primary)
        .collect();
    match primaries.as_slice() {
        [primary] if primary.optional => {
            return Err(invalid(format!(
                "primary field '{}' cannot be optional",
                primary.name
            )))
        }
        [_] => {}
        [] => return Err(invalid("no primary field".to_string())),
        _ => return Err(invalid("more than one primary field".to_string())),
    }

    let sort_field = definition
        .field(&definition.default_sorting_field)
        .ok_or_else(|| {
            invalid(format!(
                "default sorting field '{}' is not defined",
                definition.default_sorting_field
            ))
        })?;
    if sort_field.optional {
        return Err(invalid(format!(
            "default sorting field '{}' cannot be optional",
            sort_field.name
        )));
    }
    if !sort_field.field_type.is_sortable_numeric() {
        return Err(invalid(format!(
            "default sorting field '{}' must be int32, int64 or float",
            sort_field.name
        )));
    }

    Ok(())
}
