//! Pipeline orchestrator.
//!
//! Drives `Idle → Extracting → Analyzing → Validating → Displaying` for one
//! analysis, records the result in history, and hosts the independent user
//! commands (add to cart, cart/history/rewards maintenance, credential).
//! Every outcome, including errors, is reported to the [`Renderer`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info, instrument, warn};

use super::analysis_service::AnalysisService;
use super::cart_service::CartService;
use super::history_service::HistoryService;
use super::retry::RetryPolicy;
use super::rewards_service::RewardsService;
use super::state_service::StateService;
use super::validator;
use crate::domain::errors::{EcoError, EcoResult};
use crate::domain::models::rewards;
use crate::domain::models::{
    AddToCartOutcome, Assessment, CartEntry, CartSummary, HistoryEntry, PipelineState, RewardsView,
};
use crate::domain::ports::{CompletionClient, ProductExtractor, Renderer, StateKey, StateStore};
use crate::infrastructure::logging::SecretScrubber;

/// One orchestrator corresponds to one interactive session.
pub struct PipelineOrchestrator {
    state: Arc<StateService>,
    analysis: AnalysisService,
    history: HistoryService,
    cart: CartService,
    rewards: RewardsService,
    retry: RetryPolicy,
    renderer: Arc<dyn Renderer>,
    pipeline: Mutex<PipelineState>,
    /// Serializes analysis runs so the state machine sees one at a time.
    run_lock: tokio::sync::Mutex<()>,
    displayed: AtomicBool,
}

impl PipelineOrchestrator {
    pub fn new(
        store: Arc<dyn StateStore>,
        client: Arc<dyn CompletionClient>,
        renderer: Arc<dyn Renderer>,
        retry: RetryPolicy,
    ) -> Self {
        let state = Arc::new(StateService::new(store));
        Self {
            analysis: AnalysisService::new(client),
            history: HistoryService::new(Arc::clone(&state)),
            cart: CartService::new(Arc::clone(&state)),
            rewards: RewardsService::new(Arc::clone(&state)),
            state,
            retry,
            renderer,
            pipeline: Mutex::new(PipelineState::Idle),
            run_lock: tokio::sync::Mutex::new(()),
            displayed: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> PipelineState {
        *self.pipeline.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// An analysis reached `Displaying` during this session.
    pub fn has_displayed(&self) -> bool {
        self.displayed.load(Ordering::Acquire)
    }

    fn transition(&self, next: PipelineState) {
        {
            let mut current = self.pipeline.lock().unwrap_or_else(PoisonError::into_inner);
            let from = *current;
            if !from.can_transition_to(&next) {
                warn!(from = %from, to = %next, "unexpected pipeline transition");
            }
            *current = next;
        }
        self.renderer.state_changed(next);
    }

    fn fail<T>(&self, err: EcoError) -> EcoResult<T> {
        error!(kind = %err.kind(), error = %err, "pipeline failed");
        self.transition(PipelineState::Error(err.kind()));
        self.renderer.error(&err);
        Err(err)
    }

    /// Report a command error without touching the pipeline state.
    fn report<T>(&self, result: EcoResult<T>) -> EcoResult<T> {
        if let Err(err) = &result {
            warn!(kind = %err.kind(), error = %err, "command failed");
            self.renderer.error(err);
        }
        result
    }

    /// Run one analysis of whatever `extractor` finds.
    ///
    /// On success the assessment is in history and has been rendered. A
    /// failed attempt leaves history untouched.
    #[instrument(skip_all)]
    pub async fn analyze_current_page(
        &self,
        extractor: &dyn ProductExtractor,
    ) -> EcoResult<Assessment> {
        let _run = self.run_lock.lock().await;

        if self.state().is_terminal() {
            self.transition(PipelineState::Idle);
        }

        let credential = match self.stored_credential().await {
            Ok(Some(credential)) => credential,
            Ok(None) => return self.fail(EcoError::MissingCredential),
            Err(err) => return self.fail(err),
        };

        self.transition(PipelineState::Extracting);
        let product = extractor.extract();
        if !product.is_extracted() {
            return self.fail(EcoError::ExtractionFailed);
        }
        info!(title = %product.title, url = %product.url, "product extracted");

        self.transition(PipelineState::Analyzing);
        let raw = match self
            .retry
            .execute(|| self.analysis.fetch_raw(&credential, &product))
            .await
        {
            Ok(raw) => raw,
            Err(err) => return self.fail(scrub(err)),
        };

        self.transition(PipelineState::Validating);
        let assessment = match validator::validate(&raw) {
            Ok(assessment) => assessment,
            Err(err) => return self.fail(err),
        };

        let entry = HistoryEntry::new(&product.title, &product.url, assessment.clone());
        if let Err(err) = self.history.record(entry).await {
            return self.fail(err);
        }

        self.transition(PipelineState::Displaying);
        self.displayed.store(true, Ordering::Release);
        info!(overall = assessment.overall, "analysis displayed");
        self.renderer.assessment(&product, &assessment);
        Ok(assessment)
    }

    /// Add the most recent history entry to the cart and credit points.
    ///
    /// Requires an analysis to have been displayed in this session; the cart
    /// entry is built from stored history, not from memory.
    #[instrument(skip_all)]
    pub async fn add_last_to_cart(&self) -> EcoResult<AddToCartOutcome> {
        let result = self.add_last_to_cart_inner().await;
        if let Ok(outcome) = &result {
            self.renderer.cart_added(outcome);
        }
        self.report(result)
    }

    async fn add_last_to_cart_inner(&self) -> EcoResult<AddToCartOutcome> {
        if !self.has_displayed() {
            return Err(EcoError::NotDisplayed);
        }

        let latest = self.history.latest().await?;
        let entry = CartEntry::from_history(&latest);
        let cart = self.cart.add(entry.clone()).await?;

        let points_earned = rewards::award(entry.analysis.overall);
        let credit = self
            .rewards
            .credit(points_earned)
            .await
            .inspect_err(|err| {
                warn!(
                    url = %entry.url,
                    uncredited_points = points_earned,
                    error = %err,
                    "item added to cart but points were not credited"
                );
            })?;
        info!(
            url = %entry.url,
            points_earned,
            total_points = credit.total,
            "added to cart"
        );

        Ok(AddToCartOutcome {
            cart: CartSummary::of(&cart),
            entry,
            points_earned,
            total_points: credit.total,
            unlocked: rewards::is_unlocked(credit.total),
            crossed_threshold: credit.crossed_threshold(),
        })
    }

    pub async fn remove_cart_entry(&self, index: usize) -> EcoResult<CartEntry> {
        let removed = self.report(self.cart.remove_at(index).await)?;
        self.show_cart().await?;
        Ok(removed)
    }

    pub async fn clear_cart(&self) -> EcoResult<()> {
        self.report(self.cart.clear().await)?;
        self.renderer.notice("Cart cleared.");
        Ok(())
    }

    pub async fn clear_history(&self) -> EcoResult<()> {
        self.report(self.history.clear().await)?;
        self.renderer.notice("History cleared.");
        Ok(())
    }

    pub async fn reset_rewards(&self) -> EcoResult<()> {
        self.report(self.rewards.reset().await)?;
        self.renderer.notice("Rewards reset to 0 points.");
        Ok(())
    }

    pub async fn show_cart(&self) -> EcoResult<Vec<CartEntry>> {
        let entries = self.report(self.cart.list().await)?;
        self.renderer.cart(&entries, &CartSummary::of(&entries));
        Ok(entries)
    }

    pub async fn show_history(&self) -> EcoResult<Vec<HistoryEntry>> {
        let entries = self.report(self.history.list().await)?;
        self.renderer.history(&entries);
        Ok(entries)
    }

    /// Render the rewards state; an unlocked state gets a freshly drawn code.
    pub async fn show_rewards(&self) -> EcoResult<RewardsView> {
        let view = self.report(self.rewards.view().await)?;
        self.renderer.rewards(&view);
        Ok(view)
    }

    /// Store a new credential after trimming; blank input is rejected.
    pub async fn set_credential(&self, credential: &str) -> EcoResult<()> {
        let credential = credential.trim();
        if credential.is_empty() {
            return self.report(Err(EcoError::InvalidCredential));
        }
        self.report(self.state.write(StateKey::Credential, &credential).await)?;
        info!("credential saved");
        self.renderer.notice("API key saved!");
        Ok(())
    }

    pub async fn clear_credential(&self) -> EcoResult<()> {
        self.report(self.state.write(StateKey::Credential, &"").await)?;
        self.renderer.notice("API key removed.");
        Ok(())
    }

    /// Masked stored credential, if any.
    pub async fn credential_status(&self) -> EcoResult<Option<String>> {
        let masked = self
            .report(self.stored_credential().await)?
            .map(|credential| SecretScrubber::mask_credential(&credential));
        match &masked {
            Some(masked) => self.renderer.notice(&format!("API key: {masked}")),
            None => self.renderer.notice("API key: not set"),
        }
        Ok(masked)
    }

    /// An empty stored value counts as absent.
    async fn stored_credential(&self) -> EcoResult<Option<String>> {
        let stored: Option<String> = self.state.read(StateKey::Credential).await?;
        Ok(stored
            .map(|credential| credential.trim().to_string())
            .filter(|credential| !credential.is_empty()))
    }
}

/// Upstream messages may echo the submitted key.
fn scrub(err: EcoError) -> EcoError {
    match err {
        EcoError::AuthError(message) => EcoError::AuthError(SecretScrubber::scrub(&message)),
        EcoError::TransportError(message) => {
            EcoError::TransportError(SecretScrubber::scrub(&message))
        }
        EcoError::RequestRejected(message) => {
            EcoError::RequestRejected(SecretScrubber::scrub(&message))
        }
        other => other,
    }
}
