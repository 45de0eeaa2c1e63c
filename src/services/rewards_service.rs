use std::sync::Arc;
use tracing::{info, instrument};

use super::state_service::{Mutation, StateService};
use crate::domain::errors::EcoResult;
use crate::domain::models::rewards;
use crate::domain::models::RewardsView;
use crate::domain::ports::StateKey;

/// Result of crediting points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credit {
    pub before: u64,
    pub total: u64,
}

impl Credit {
    pub const fn crossed_threshold(self) -> bool {
        rewards::crossed_threshold(self.before, self.total)
    }
}

/// Stored loyalty-points counter.
pub struct RewardsService {
    state: Arc<StateService>,
}

impl RewardsService {
    pub const fn new(state: Arc<StateService>) -> Self {
        Self { state }
    }

    /// Stored total; zero when never set.
    pub async fn points(&self) -> EcoResult<u64> {
        Ok(self.state.read(StateKey::RewardsPoints).await?.unwrap_or(0))
    }

    /// Add `earned` to the stored total.
    ///
    /// Nothing is written when `earned` is zero.
    #[instrument(skip(self))]
    pub async fn credit(&self, earned: u64) -> EcoResult<Credit> {
        let credit = self
            .state
            .update(StateKey::RewardsPoints, move |current: Option<u64>| {
                let before = current.unwrap_or(0);
                let total = rewards::accumulate(before, earned);
                let mutation = if earned > 0 {
                    Mutation::Put(total)
                } else {
                    Mutation::Keep
                };
                Ok((mutation, Credit { before, total }))
            })
            .await?;

        if credit.crossed_threshold() {
            info!(total = credit.total, "reward unlocked");
        }
        Ok(credit)
    }

    pub async fn reset(&self) -> EcoResult<()> {
        self.state
            .write(StateKey::RewardsPoints, &rewards::reset())
            .await?;
        info!("rewards reset");
        Ok(())
    }

    /// Render-ready view; draws a fresh code when unlocked.
    pub async fn view(&self) -> EcoResult<RewardsView> {
        Ok(RewardsView::render(self.points().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStateStore;
    use crate::domain::ports::StateStore;

    fn service_with_store() -> (RewardsService, Arc<InMemoryStateStore>) {
        let store = Arc::new(InMemoryStateStore::new());
        let state = Arc::new(StateService::new(store.clone()));
        (RewardsService::new(state), store)
    }

    #[tokio::test]
    async fn test_credit_crosses_threshold() {
        let (rewards, _) = service_with_store();
        rewards.credit(6).await.unwrap();

        let credit = rewards.credit(5).await.unwrap();
        assert_eq!(credit, Credit { before: 6, total: 11 });
        assert!(credit.crossed_threshold());

        let view = rewards.view().await.unwrap();
        assert!(view.unlocked);
        assert_eq!(view.display_points, 10);
        assert_eq!(view.progress_percent, 100);
        assert!(view.code.is_some());
    }

    #[tokio::test]
    async fn test_zero_credit_does_not_write() {
        let (rewards, store) = service_with_store();
        let credit = rewards.credit(0).await.unwrap();
        assert_eq!(credit.total, 0);
        assert!(store
            .get(&[StateKey::RewardsPoints])
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_total_is_not_capped_and_reset_zeroes() {
        let (rewards, _) = service_with_store();
        rewards.credit(30).await.unwrap();
        rewards.credit(15).await.unwrap();
        assert_eq!(rewards.points().await.unwrap(), 45);

        rewards.reset().await.unwrap();
        assert_eq!(rewards.points().await.unwrap(), 0);
        let view = rewards.view().await.unwrap();
        assert!(!view.unlocked);
        assert!(view.code.is_none());
    }
}
