use crate::domain::error::AveoError;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Source of wall-clock time in milliseconds since the Unix epoch.
///
/// Injected into caches so expiry can be tested without sleeping.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// A change notification emitted by a [`KeyValueStore`] after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Saved(String),
    Removed(String),
}

impl StoreEvent {
    pub fn key(&self) -> &str {
        match self {
            StoreEvent::Saved(k) | StoreEvent::Removed(k) => k,
        }
    }
}

/// String key/value storage for client-side state (cart, session token).
///
/// Implementations broadcast a [`StoreEvent`] after every successful write so
/// other holders of the same store can reload.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, AveoError>;

    async fn save(&self, key: &str, value: &str) -> Result<(), AveoError>;

    async fn remove(&self, key: &str) -> Result<(), AveoError>;

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}
