//! Common test utilities for integration tests
//!
//! Provides shared fixtures used across multiple integration test files:
//! a scripted completion client, a renderer that records what it was asked
//! to show, and canned analysis responses.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ecoscan::adapters::InMemoryStateStore;
use ecoscan::domain::models::{
    AddToCartOutcome, Assessment, CartEntry, CartSummary, HistoryEntry, PipelineState,
    ProductInfo, RewardsView,
};
use ecoscan::domain::ports::{CompletionClient, Renderer, StateStore};
use ecoscan::{EcoError, EcoResult, PipelineOrchestrator, RetryPolicy};

pub const TEST_KEY: &str = "sk-ant-api03-test-key-0000";

/// A well-formed analysis with the given overall score and carbon figure.
pub fn analysis_json(overall: f64, kg_co2e: f64) -> String {
    serde_json::json!({
        "carbonFootprint": {
            "kgCO2e": kg_co2e,
            "description": "Mostly from cotton farming",
            "comparison": "About a 10 km car ride"
        },
        "scores": {
            "production": 7,
            "materials": 8,
            "transportation": 6,
            "packaging": 9,
            "endOfLife": 7
        },
        "overall": overall,
        "quickSummary": "Organic cotton with low-impact packaging.",
        "categoryDetails": {
            "materials": {
                "explanation": "What the product is made of",
                "insight": "Certified organic cotton",
                "tips": "Look for GOTS certification"
            }
        },
        "recommendations": "Wash cold and line dry."
    })
    .to_string()
}

/// Completion client replaying scripted replies in order.
///
/// Once the script runs out the last reply repeats.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<EcoResult<String>>>,
    last: Mutex<Option<EcoResult<String>>>,
    calls: AtomicUsize,
    credentials: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<EcoResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            credentials: Mutex::new(Vec::new()),
        })
    }

    pub fn always(reply: EcoResult<String>) -> Arc<Self> {
        Self::new(vec![reply])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn credentials(&self) -> Vec<String> {
        self.credentials.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, credential: &str, _prompt: &str) -> EcoResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.credentials.lock().unwrap().push(credential.to_string());
        let next = self.replies.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(reply) = next {
            *last = Some(reply);
        }
        (*last).clone()
            .unwrap_or_else(|| Err(EcoError::TransportError("no scripted reply".to_string())))
    }
}

/// Everything a renderer was asked to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    State(PipelineState),
    Assessment(String, f64),
    CartAdded(AddToCartOutcome),
    Cart(usize, CartSummary),
    History(usize),
    Rewards(RewardsView),
    Error(EcoError),
    Notice(String),
}

#[derive(Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<Event>>,
}

impl RecordingRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn states(&self) -> Vec<PipelineState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::State(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<EcoError> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Error(err) => Some(err),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Notice(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl Renderer for RecordingRenderer {
    fn state_changed(&self, state: PipelineState) {
        self.push(Event::State(state));
    }

    fn assessment(&self, product: &ProductInfo, assessment: &Assessment) {
        self.push(Event::Assessment(product.title.clone(), assessment.overall));
    }

    fn cart_added(&self, outcome: &AddToCartOutcome) {
        self.push(Event::CartAdded(outcome.clone()));
    }

    fn cart(&self, entries: &[CartEntry], summary: &CartSummary) {
        self.push(Event::Cart(entries.len(), *summary));
    }

    fn history(&self, entries: &[HistoryEntry]) {
        self.push(Event::History(entries.len()));
    }

    fn rewards(&self, view: &RewardsView) {
        self.push(Event::Rewards(view.clone()));
    }

    fn error(&self, error: &EcoError) {
        self.push(Event::Error(error.clone()));
    }

    fn notice(&self, message: &str) {
        self.push(Event::Notice(message.to_string()));
    }
}

/// An orchestrator over a fresh in-memory store.
pub struct Harness {
    pub store: Arc<InMemoryStateStore>,
    pub client: Arc<ScriptedClient>,
    pub renderer: Arc<RecordingRenderer>,
    pub orchestrator: PipelineOrchestrator,
}

impl Harness {
    pub fn new(client: Arc<ScriptedClient>) -> Self {
        Self::with_store(Arc::new(InMemoryStateStore::new()), client)
    }

    pub fn with_store(store: Arc<InMemoryStateStore>, client: Arc<ScriptedClient>) -> Self {
        let renderer = RecordingRenderer::new();
        let orchestrator = PipelineOrchestrator::new(
            Arc::clone(&store) as Arc<dyn StateStore>,
            Arc::clone(&client) as Arc<dyn CompletionClient>,
            Arc::clone(&renderer) as Arc<dyn Renderer>,
            RetryPolicy::new(1, 1, 1),
        );
        Self {
            store,
            client,
            renderer,
            orchestrator,
        }
    }

    /// Harness with the test key already stored.
    pub async fn with_credential(client: Arc<ScriptedClient>) -> Self {
        let harness = Self::new(client);
        harness.orchestrator.set_credential(TEST_KEY).await.unwrap();
        harness
    }
}

pub fn product(title: &str, url: &str) -> ProductInfo {
    ProductInfo::new(title, url).with_price("$19.99")
}
