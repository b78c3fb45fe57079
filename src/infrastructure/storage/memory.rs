use crate::domain::error::AveoError;
use crate::domain::traits::{KeyValueStore, StoreEvent};
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;

/// Process-local key/value store. Contents are lost on drop.
pub struct MemoryStore {
    map: DashMap<String, String>,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            map: DashMap::new(),
            events,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>, AveoError> {
        Ok(self.map.get(key).map(|v| v.value().clone()))
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), AveoError> {
        self.map.insert(key.to_string(), value.to_string());
        // no receivers is fine
        let _ = self.events.send(StoreEvent::Saved(key.to_string()));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AveoError> {
        self.map.remove(key);
        let _ = self.events.send(StoreEvent::Removed(key.to_string()));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}
