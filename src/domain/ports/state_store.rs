use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{EcoError, EcoResult};

/// Keys held in the persistent state store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKey {
    /// API credential for the analysis service (string)
    Credential,
    /// Most-recent-first sequence of history entries (max 10)
    History,
    /// Ordered sequence of cart entries, unique by url
    Cart,
    /// Accumulated loyalty points (non-negative integer)
    RewardsPoints,
}

impl StateKey {
    pub const ALL: [Self; 4] = [Self::Credential, Self::History, Self::Cart, Self::RewardsPoints];

    /// Storage name of the key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credential => "credential",
            Self::History => "history",
            Self::Cart => "cart",
            Self::RewardsPoints => "rewardsPoints",
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateKey {
    type Err = EcoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| EcoError::Storage(format!("unknown state key: {s}")))
    }
}

/// Snapshot of some keys; a key that was never set is simply absent.
pub type StateValues = HashMap<StateKey, Value>;

/// Port for the durable key-value store.
///
/// Keys are independent. Implementations give no transaction across a
/// `get` followed by a `set`, so two interleaved read-modify-write sequences
/// on the same key can lose an update. Callers that mutate state must go
/// through [`crate::services::StateService`], which serializes mutations per key.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the given keys. Keys that were never set are absent from the result.
    async fn get(&self, keys: &[StateKey]) -> EcoResult<StateValues>;

    /// Write every given key, replacing its previous value.
    async fn set(&self, values: StateValues) -> EcoResult<()>;
}
