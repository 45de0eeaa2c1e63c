use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::errors::EcoResult;
use crate::domain::ports::{StateKey, StateStore, StateValues};

/// Process-local [`StateStore`] used by tests and the `memory` backend.
///
/// Like the durable store it offers no atomic read-modify-write; every
/// `get` and `set` takes the lock independently.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    entries: RwLock<StateValues>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store.
    pub fn with_values(values: StateValues) -> Self {
        Self {
            entries: RwLock::new(values),
        }
    }

    /// Copy of everything currently stored.
    pub async fn snapshot(&self) -> HashMap<StateKey, serde_json::Value> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, keys: &[StateKey]) -> EcoResult<StateValues> {
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| entries.get(key).map(|value| (*key, value.clone())))
            .collect())
    }

    async fn set(&self, values: StateValues) -> EcoResult<()> {
        self.entries.write().await.extend(values);
        Ok(())
    }
}
