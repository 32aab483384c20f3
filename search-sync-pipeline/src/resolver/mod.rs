//! Field path resolution.
//!
//! Resolves dotted attribute paths such as `author.country` against a
//! [`Record`]. Each segment is read with a list of access strategies tried
//! in order: direct property access first, then the getter-style accessor.

use std::sync::Arc;

use search_sync_shared::{FieldValue, Record};

/// Result of resolving a path.
///
/// `Missing` and `Value(FieldValue::Null)` are different answers: the first
/// means the path does not lead anywhere, the second that the final
/// attribute exists and is empty.
#[derive(Debug, Clone)]
pub enum Resolved {
    Value(FieldValue),
    Missing,
}

impl Resolved {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// The value, treating a present `Null` like a missing one.
    pub fn into_present(self) -> Option<FieldValue> {
        match self {
            Self::Value(FieldValue::Null) | Self::Missing => None,
            Self::Value(value) => Some(value),
        }
    }
}

/// One way of reading a single attribute from a record.
pub trait AccessStrategy: Send + Sync {
    fn read(&self, record: &dyn Record, name: &str) -> Option<FieldValue>;
}

/// Direct attribute access.
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyAccess;

impl AccessStrategy for PropertyAccess {
    fn read(&self, record: &dyn Record, name: &str) -> Option<FieldValue> {
        record.property(name)
    }
}

/// Getter-style access for computed attributes.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessorAccess;

impl AccessStrategy for AccessorAccess {
    fn read(&self, record: &dyn Record, name: &str) -> Option<FieldValue> {
        record.accessor(name)
    }
}

/// Walks dotted paths through nested records.
pub struct PathResolver {
    strategies: Vec<Box<dyn AccessStrategy>>,
}

impl PathResolver {
    /// Resolver with property access followed by accessor access.
    pub fn new() -> Self {
        Self {
            strategies: vec![Box::new(PropertyAccess), Box::new(AccessorAccess)],
        }
    }

    /// Resolver with a custom, ordered list of strategies.
    pub fn with_strategies(strategies: Vec<Box<dyn AccessStrategy>>) -> Self {
        Self { strategies }
    }

    fn read(&self, record: &dyn Record, name: &str) -> Option<FieldValue> {
        self.strategies
            .iter()
            .find_map(|strategy| strategy.read(record, name))
    }

    /// Resolve `path` against `record`.
    ///
    /// Intermediate segments must yield a nested record; a null, absent or
    /// scalar intermediate value makes the whole path `Missing`.
    pub fn resolve(&self, record: &dyn Record, path: &str) -> Resolved {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Resolved::Missing;
        }

        let last = segments.len() - 1;
        let mut nested: Option<Arc<dyn Record>> = None;

        for (position, segment) in segments.iter().enumerate() {
            let current: &dyn Record = match &nested {
                Some(record) => record.as_ref(),
                None => record,
            };

            let Some(value) = self.read(current, segment) else {
                return Resolved::Missing;
            };

            if position == last {
                return Resolved::Value(value);
            }

            match value {
                FieldValue::Object(next) => nested = Some(next),
                _ => return Resolved::Missing,
            }
        }

        Resolved::Missing
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new()
    }
}
