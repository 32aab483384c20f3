//! Mutation observer trait definition.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use search_sync_shared::Record;

/// Types of entity mutations the data layer reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Entity was persisted for the first time.
    Created,
    /// Entity was changed.
    Updated,
    /// Entity was removed.
    Deleted,
}

/// One entity mutation within a unit of work.
#[derive(Clone)]
pub struct MutationEvent {
    /// The type of mutation.
    pub kind: MutationKind,
    /// Type identifier of the entity, matched against collection definitions.
    pub source_type: String,
    /// The entity as it was at the time of the mutation.
    pub entity: Arc<dyn Record>,
}

impl MutationEvent {
    /// Create a new creation event.
    pub fn created(source_type: impl Into<String>, entity: Arc<dyn Record>) -> Self {
        Self {
            kind: MutationKind::Created,
            source_type: source_type.into(),
            entity,
        }
    }

    /// Create a new update event.
    pub fn updated(source_type: impl Into<String>, entity: Arc<dyn Record>) -> Self {
        Self {
            kind: MutationKind::Updated,
            source_type: source_type.into(),
            entity,
        }
    }

    /// Create a new delete event.
    pub fn deleted(source_type: impl Into<String>, entity: Arc<dyn Record>) -> Self {
        Self {
            kind: MutationKind::Deleted,
            source_type: source_type.into(),
            entity,
        }
    }
}

impl fmt::Debug for MutationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationEvent")
            .field("kind", &self.kind)
            .field("source_type", &self.source_type)
            .field("entity", &self.entity.to_json())
            .finish()
    }
}

/// Receiver of data-layer notifications.
///
/// The data layer calls `on_mutation` for every create/update/delete during
/// a unit of work and `on_flush` once the unit of work is committed.
/// Observers must not fail the data layer: errors are theirs to handle.
#[async_trait]
pub trait MutationObserver: Send + Sync {
    async fn on_mutation(&self, event: &MutationEvent);

    async fn on_flush(&self);
}
