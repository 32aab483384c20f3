//! Mutation notifications.
//!
//! The data layer publishes entity mutations and unit-of-work boundaries to
//! a [`MutationBus`]; every subscribed [`MutationObserver`] receives them in
//! subscription order.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::trace;

use search_sync_repository::{MutationEvent, MutationObserver};

/// Fan-out of data-layer notifications to observers.
#[derive(Default)]
pub struct MutationBus {
    observers: RwLock<Vec<Arc<dyn MutationObserver>>>,
}

impl MutationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, observer: Arc<dyn MutationObserver>) {
        self.observers.write().await.push(observer);
    }

    pub async fn observer_count(&self) -> usize {
        self.observers.read().await.len()
    }

    /// Deliver one mutation to every observer.
    pub async fn publish(&self, event: MutationEvent) {
        let observers = self.observers.read().await.clone();
        trace!(
            kind = ?event.kind,
            source_type = %event.source_type,
            observers = observers.len(),
            "Publishing mutation"
        );
        for observer in observers {
            observer.on_mutation(&event).await;
        }
    }

    /// Signal the end of the current unit of work.
    pub async fn flush(&self) {
        let observers = self.observers.read().await.clone();
        for observer in observers {
            observer.on_flush().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use search_sync_repository::MutationKind;
    use serde_json::json;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl MutationObserver for Recorder {
        async fn on_mutation(&self, event: &MutationEvent) {
            self.log
                .lock()
                .unwrap()
                .push(format!("{} {:?} {}", self.name, event.kind, event.source_type));
        }

        async fn on_flush(&self) {
            self.log.lock().unwrap().push(format!("{} flush", self.name));
        }
    }

    #[tokio::test]
    async fn test_events_reach_observers_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = MutationBus::new();
        bus.subscribe(Arc::new(Recorder { name: "a", log: log.clone() }))
            .await;
        bus.subscribe(Arc::new(Recorder { name: "b", log: log.clone() }))
            .await;

        bus.publish(MutationEvent::updated("book", Arc::new(json!({"id": 1}))))
            .await;
        bus.flush().await;

        assert_eq!(bus.observer_count().await, 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                format!("a {:?} book", MutationKind::Updated),
                format!("b {:?} book", MutationKind::Updated),
                "a flush".to_string(),
                "b flush".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_publish_without_observers() {
        let bus = MutationBus::new();
        bus.publish(MutationEvent::deleted("book", Arc::new(json!({"id": 1}))))
            .await;
        bus.flush().await;
    }
}
