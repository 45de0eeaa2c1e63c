use std::sync::Arc;
use tracing::{info, instrument};

use super::state_service::{Mutation, StateService};
use crate::domain::errors::{EcoError, EcoResult};
use crate::domain::models::{HistoryEntry, MAX_HISTORY_ENTRIES};
use crate::domain::ports::StateKey;

/// Bounded, most-recent-first analysis history.
pub struct HistoryService {
    state: Arc<StateService>,
}

impl HistoryService {
    pub const fn new(state: Arc<StateService>) -> Self {
        Self { state }
    }

    /// Prepend `entry`, keeping at most [`MAX_HISTORY_ENTRIES`].
    ///
    /// Returns the new history length. Repeated analyses of one page are
    /// all kept.
    #[instrument(skip(self, entry), fields(url = %entry.url))]
    pub async fn record(&self, entry: HistoryEntry) -> EcoResult<usize> {
        self.state
            .update(StateKey::History, move |current: Option<Vec<HistoryEntry>>| {
                let history = prepend_bounded(current.unwrap_or_default(), entry);
                let len = history.len();
                Ok((Mutation::Put(history), len))
            })
            .await
    }

    pub async fn list(&self) -> EcoResult<Vec<HistoryEntry>> {
        Ok(self.state.read(StateKey::History).await?.unwrap_or_default())
    }

    /// Most recent entry; `EmptyHistory` when nothing was analyzed yet.
    pub async fn latest(&self) -> EcoResult<HistoryEntry> {
        self.list()
            .await?
            .into_iter()
            .next()
            .ok_or(EcoError::EmptyHistory)
    }

    pub async fn clear(&self) -> EcoResult<()> {
        self.state
            .write(StateKey::History, &Vec::<HistoryEntry>::new())
            .await?;
        info!("history cleared");
        Ok(())
    }
}

/// `entry` first, followed by the newest entries of `history`.
pub fn prepend_bounded(mut history: Vec<HistoryEntry>, entry: HistoryEntry) -> Vec<HistoryEntry> {
    history.insert(0, entry);
    history.truncate(MAX_HISTORY_ENTRIES);
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStateStore;
    use crate::domain::errors::ErrorKind;
    use crate::domain::models::{Assessment, Scores};

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry::new(
            format!("Product {n}"),
            format!("https://shop.example/{n}"),
            Assessment::new(5.0, Scores::uniform(5.0)),
        )
    }

    fn service() -> HistoryService {
        HistoryService::new(Arc::new(StateService::new(Arc::new(
            InMemoryStateStore::new(),
        ))))
    }

    #[tokio::test]
    async fn test_eleventh_entry_evicts_oldest() {
        let history = service();
        for n in 0..10 {
            history.record(entry(n)).await.unwrap();
        }
        let before = history.list().await.unwrap();
        assert_eq!(before.len(), 10);
        assert_eq!(before[9].title, "Product 0");

        let len = history.record(entry(10)).await.unwrap();
        assert_eq!(len, 10);

        let after = history.list().await.unwrap();
        assert_eq!(after[0].title, "Product 10");
        assert_eq!(after[9].title, "Product 1");
        assert!(after.iter().all(|e| e.title != "Product 0"));
    }

    #[tokio::test]
    async fn test_repeated_analysis_is_not_deduplicated() {
        let history = service();
        history.record(entry(1)).await.unwrap();
        history.record(entry(1)).await.unwrap();
        assert_eq!(history.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_latest_and_clear() {
        let history = service();
        assert_eq!(
            history.latest().await.unwrap_err().kind(),
            ErrorKind::EmptyHistory
        );

        history.record(entry(1)).await.unwrap();
        history.record(entry(2)).await.unwrap();
        assert_eq!(history.latest().await.unwrap().title, "Product 2");

        history.clear().await.unwrap();
        assert!(history.list().await.unwrap().is_empty());
        assert_eq!(
            history.latest().await.unwrap_err().kind(),
            ErrorKind::EmptyHistory
        );
    }
}
