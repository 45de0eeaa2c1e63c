//! Serialized access to the state store.
//!
//! The store's `get`/`set` pair is not atomic, so two read-modify-write
//! sequences on the same key can interleave and lose an update. Every
//! mutation goes through [`StateService::update`], which holds that key's
//! mutex from the read until the write has landed. Reads do not lock.
//! No operation holds more than one key's mutex at a time.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::domain::errors::EcoResult;
use crate::domain::ports::{StateKey, StateStore, StateValues};

/// What an update closure wants done with the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation<T> {
    /// Write the new value.
    Put(T),
    /// Leave the stored value as it is.
    Keep,
}

/// Typed, per-key serialized wrapper around a [`StateStore`].
pub struct StateService {
    store: Arc<dyn StateStore>,
    locks: [Mutex<()>; StateKey::ALL.len()],
}

impl StateService {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            locks: Default::default(),
        }
    }

    const fn lock_for(&self, key: StateKey) -> &Mutex<()> {
        let slot = match key {
            StateKey::Credential => 0,
            StateKey::History => 1,
            StateKey::Cart => 2,
            StateKey::RewardsPoints => 3,
        };
        &self.locks[slot]
    }

    /// Current value of `key`, `None` when it was never set.
    pub async fn read<T: DeserializeOwned>(&self, key: StateKey) -> EcoResult<Option<T>> {
        let mut values = self.store.get(&[key]).await?;
        values
            .remove(&key)
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    /// Overwrite `key`, serialized with any update in progress on it.
    pub async fn write<T: Serialize + Sync>(&self, key: StateKey, value: &T) -> EcoResult<()> {
        let _guard = self.lock_for(key).lock().await;
        self.put(key, value).await
    }

    /// Read-modify-write `key` under its mutex.
    ///
    /// `mutate` receives the current value (`None` if never set) and decides
    /// whether to write; its error aborts the update without writing.
    #[instrument(skip(self, key, mutate), fields(key = %key))]
    pub async fn update<T, R, F>(&self, key: StateKey, mutate: F) -> EcoResult<R>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        R: Send,
        F: FnOnce(Option<T>) -> EcoResult<(Mutation<T>, R)> + Send,
    {
        let _guard = self.lock_for(key).lock().await;

        let current = self.read(key).await?;
        let (mutation, result) = mutate(current)?;
        match mutation {
            Mutation::Put(value) => self.put(key, &value).await?,
            Mutation::Keep => debug!("update left value unchanged"),
        }
        Ok(result)
    }

    async fn put<T: Serialize + Sync>(&self, key: StateKey, value: &T) -> EcoResult<()> {
        let mut values = StateValues::with_capacity(1);
        values.insert(key, serde_json::to_value(value)?);
        self.store.set(values).await
    }
}
