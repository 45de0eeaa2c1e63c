//! End-to-end pipeline scenarios against the in-memory store.

mod common;

use regex::Regex;
use serde_json::json;
use std::sync::Arc;

use common::{analysis_json, product, Event, Harness, ScriptedClient, TEST_KEY};
use ecoscan::adapters::{InMemoryStateStore, StaticExtractor};
use ecoscan::domain::errors::ErrorKind;
use ecoscan::domain::models::{Assessment, CartEntry, HistoryEntry, ProductInfo, Scores};
use ecoscan::domain::ports::{StateKey, StateStore, StateValues};
use ecoscan::services::{CartService, StateService};
use ecoscan::{EcoError, PipelineState};

fn extractor(title: &str, url: &str) -> StaticExtractor {
    StaticExtractor::new(product(title, url))
}

async fn stored<T: serde::de::DeserializeOwned>(store: &InMemoryStateStore, key: StateKey) -> Option<T> {
    store
        .snapshot()
        .await
        .get(&key)
        .map(|value| serde_json::from_value(value.clone()).unwrap())
}

#[tokio::test]
async fn test_missing_credential_stops_before_extraction() {
    let harness = Harness::new(ScriptedClient::always(Ok(analysis_json(8.0, 2.0))));

    let err = harness
        .orchestrator
        .analyze_current_page(&extractor("Tee", "u1"))
        .await
        .unwrap_err();

    assert_eq!(err, EcoError::MissingCredential);
    assert_eq!(
        harness.orchestrator.state(),
        PipelineState::Error(ErrorKind::MissingCredential)
    );
    assert_eq!(harness.client.calls(), 0);
    assert_eq!(harness.renderer.errors(), vec![EcoError::MissingCredential]);
    assert!(stored::<Vec<HistoryEntry>>(&harness.store, StateKey::History).await.is_none());
}

#[tokio::test]
async fn test_blank_title_is_extraction_failure() {
    let harness = Harness::with_credential(ScriptedClient::always(Ok(analysis_json(8.0, 2.0)))).await;

    let err = harness
        .orchestrator
        .analyze_current_page(&StaticExtractor::new(ProductInfo::new("   ", "u1")))
        .await
        .unwrap_err();

    assert_eq!(err, EcoError::ExtractionFailed);
    assert_eq!(harness.client.calls(), 0);
    assert_eq!(
        harness.renderer.states(),
        vec![
            PipelineState::Extracting,
            PipelineState::Error(ErrorKind::ExtractionFailed)
        ]
    );
}

#[tokio::test]
async fn test_fenced_response_is_analyzed_and_recorded() {
    let fenced = format!("```json\n{}\n```", analysis_json(7.4, 3.2));
    let harness = Harness::with_credential(ScriptedClient::always(Ok(fenced))).await;

    let assessment = harness
        .orchestrator
        .analyze_current_page(&extractor("Organic tee", "https://shop.example/tee"))
        .await
        .unwrap();

    assert!((assessment.overall - 7.4).abs() < f64::EPSILON);
    assert_eq!(harness.client.credentials(), vec![TEST_KEY.to_string()]);
    assert_eq!(
        harness.renderer.states(),
        vec![
            PipelineState::Extracting,
            PipelineState::Analyzing,
            PipelineState::Validating,
            PipelineState::Displaying,
        ]
    );
    assert!(harness
        .renderer
        .events()
        .contains(&Event::Assessment("Organic tee".to_string(), 7.4)));

    let history: Vec<HistoryEntry> = stored(&harness.store, StateKey::History).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].url, "https://shop.example/tee");
    assert_eq!(history[0].analysis, assessment);
    assert!(harness.orchestrator.has_displayed());
}

#[tokio::test]
async fn test_fenced_and_plain_responses_validate_identically() {
    let plain = Harness::with_credential(ScriptedClient::always(Ok(analysis_json(6.0, 1.0)))).await;
    let fenced = Harness::with_credential(ScriptedClient::always(Ok(format!(
        "```\n{}\n```",
        analysis_json(6.0, 1.0)
    ))))
    .await;

    let a = plain
        .orchestrator
        .analyze_current_page(&extractor("Mug", "u1"))
        .await
        .unwrap();
    let b = fenced
        .orchestrator
        .analyze_current_page(&extractor("Mug", "u1"))
        .await
        .unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_out_of_range_score_is_stored_clamped() {
    let raw = json!({
        "scores": {"production": 11, "materials": 5, "transportation": 5, "packaging": 5, "endOfLife": 5},
        "overall": 6
    })
    .to_string();
    let harness = Harness::with_credential(ScriptedClient::always(Ok(raw))).await;

    harness
        .orchestrator
        .analyze_current_page(&extractor("Kettle", "u1"))
        .await
        .unwrap();

    let history: Vec<HistoryEntry> = stored(&harness.store, StateKey::History).await.unwrap();
    assert!((history[0].analysis.scores.production - 10.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_malformed_response_leaves_history_untouched() {
    let harness =
        Harness::with_credential(ScriptedClient::always(Ok("Sorry, I can't help.".to_string())))
            .await;

    let err = harness
        .orchestrator
        .analyze_current_page(&extractor("Lamp", "u1"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    assert!(stored::<Vec<HistoryEntry>>(&harness.store, StateKey::History).await.is_none());
    assert!(!harness.orchestrator.has_displayed());
}

#[tokio::test]
async fn test_transport_error_is_retried_once() {
    let client = ScriptedClient::new(vec![
        Err(EcoError::TransportError("connection reset".to_string())),
        Ok(analysis_json(8.0, 2.0)),
    ]);
    let harness = Harness::with_credential(client).await;

    harness
        .orchestrator
        .analyze_current_page(&extractor("Bottle", "u1"))
        .await
        .unwrap();
    assert_eq!(harness.client.calls(), 2);
}

#[tokio::test]
async fn test_rejected_request_is_not_retried() {
    let client = ScriptedClient::new(vec![
        Err(EcoError::RequestRejected("HTTP 400 Bad Request: prompt is too long".to_string())),
        Ok(analysis_json(8.0, 2.0)),
    ]);
    let harness = Harness::with_credential(client).await;

    let err = harness
        .orchestrator
        .analyze_current_page(&extractor("Bottle", "u1"))
        .await
        .unwrap_err();

    assert_eq!(harness.client.calls(), 1);
    assert_eq!(err.kind(), ErrorKind::TransportError);
    assert_eq!(
        harness.renderer.states().last(),
        Some(&PipelineState::Error(ErrorKind::TransportError))
    );
}

#[tokio::test]
async fn test_auth_error_is_not_retried_and_is_scrubbed() {
    let client = ScriptedClient::always(Err(EcoError::AuthError(format!(
        "invalid x-api-key {TEST_KEY}"
    ))));
    let harness = Harness::with_credential(client).await;

    let err = harness
        .orchestrator
        .analyze_current_page(&extractor("Bottle", "u1"))
        .await
        .unwrap_err();

    assert_eq!(harness.client.calls(), 1);
    assert_eq!(err.kind(), ErrorKind::AuthError);
    assert!(!err.to_string().contains(TEST_KEY));
    assert!(!format!("{:?}", harness.renderer.errors()).contains(TEST_KEY));
}

#[tokio::test]
async fn test_retrigger_after_error_restarts_from_idle() {
    let client = ScriptedClient::new(vec![
        Ok("not json".to_string()),
        Ok(analysis_json(8.0, 2.0)),
    ]);
    let harness = Harness::with_credential(client).await;

    assert!(harness
        .orchestrator
        .analyze_current_page(&extractor("Bottle", "u1"))
        .await
        .is_err());
    harness
        .orchestrator
        .analyze_current_page(&extractor("Bottle", "u1"))
        .await
        .unwrap();

    let states = harness.renderer.states();
    let error_at = states
        .iter()
        .position(|s| matches!(s, PipelineState::Error(_)))
        .unwrap();
    assert_eq!(states[error_at + 1], PipelineState::Idle);
    assert_eq!(harness.orchestrator.state(), PipelineState::Displaying);
}

#[tokio::test]
async fn test_add_to_cart_requires_a_displayed_analysis() {
    let harness = Harness::with_credential(ScriptedClient::always(Ok(analysis_json(8.0, 2.0)))).await;

    let err = harness.orchestrator.add_last_to_cart().await.unwrap_err();
    assert_eq!(err, EcoError::NotDisplayed);
    assert!(stored::<Vec<CartEntry>>(&harness.store, StateKey::Cart).await.is_none());
}

#[tokio::test]
async fn test_first_cart_add_with_top_score() {
    let harness = Harness::with_credential(ScriptedClient::always(Ok(analysis_json(9.2, 4.5)))).await;
    harness
        .orchestrator
        .analyze_current_page(&extractor("Solar charger", "u1"))
        .await
        .unwrap();

    let outcome = harness.orchestrator.add_last_to_cart().await.unwrap();

    assert_eq!(outcome.points_earned, 30);
    assert_eq!(outcome.total_points, 30);
    assert!(outcome.unlocked);
    assert!(outcome.crossed_threshold);
    assert_eq!(outcome.cart.count, 1);
    assert_eq!(outcome.cart.average_overall, Some(9.2));
    assert!((outcome.cart.total_carbon_kg - 4.5).abs() < f64::EPSILON);
    assert_eq!(stored::<u64>(&harness.store, StateKey::RewardsPoints).await, Some(30));
    assert!(harness
        .renderer
        .events()
        .iter()
        .any(|e| matches!(e, Event::CartAdded(o) if o.entry.url == "u1")));
}

#[tokio::test]
async fn test_duplicate_url_is_rejected_without_points() {
    let harness = Harness::with_credential(ScriptedClient::always(Ok(analysis_json(8.0, 1.0)))).await;
    harness
        .orchestrator
        .analyze_current_page(&extractor("Tote", "u1"))
        .await
        .unwrap();
    harness.orchestrator.add_last_to_cart().await.unwrap();

    let err = harness.orchestrator.add_last_to_cart().await.unwrap_err();

    assert_eq!(err, EcoError::AlreadyInCart("Tote".to_string()));
    assert_eq!(stored::<u64>(&harness.store, StateKey::RewardsPoints).await, Some(15));
    let cart: Vec<CartEntry> = stored(&harness.store, StateKey::Cart).await.unwrap();
    assert_eq!(cart.len(), 1);
}

#[tokio::test]
async fn test_low_score_earns_nothing_and_skips_rewards_write() {
    let harness = Harness::with_credential(ScriptedClient::always(Ok(analysis_json(5.5, 1.0)))).await;
    harness
        .orchestrator
        .analyze_current_page(&extractor("Fast fashion tee", "u1"))
        .await
        .unwrap();

    let outcome = harness.orchestrator.add_last_to_cart().await.unwrap();

    assert_eq!(outcome.points_earned, 0);
    assert!(!outcome.unlocked);
    assert!(!harness.store.snapshot().await.contains_key(&StateKey::RewardsPoints));
}

#[tokio::test]
async fn test_crossing_threshold_unlocks_a_fresh_code() {
    let mut seeded = StateValues::new();
    seeded.insert(StateKey::RewardsPoints, json!(6));
    let store = Arc::new(InMemoryStateStore::with_values(seeded));
    let harness = Harness::with_store(
        store,
        ScriptedClient::always(Ok(analysis_json(7.5, 1.0))),
    );
    harness.orchestrator.set_credential(TEST_KEY).await.unwrap();
    harness
        .orchestrator
        .analyze_current_page(&extractor("Jar", "u1"))
        .await
        .unwrap();

    let outcome = harness.orchestrator.add_last_to_cart().await.unwrap();
    assert_eq!(outcome.points_earned, 5);
    assert_eq!(outcome.total_points, 11);
    assert!(outcome.unlocked);
    assert!(outcome.crossed_threshold);

    let view = harness.orchestrator.show_rewards().await.unwrap();
    assert_eq!(view.points, 11);
    assert_eq!(view.display_points, 10);
    assert_eq!(view.progress_percent, 100);
    let code = view.code.unwrap();
    assert!(Regex::new(r"^ECO[A-Z0-9]{6}$").unwrap().is_match(code.as_str()));

    // The code is display-only.
    let snapshot = harness.store.snapshot().await;
    assert!(!snapshot.values().any(|v| v.to_string().contains(code.as_str())));
}

#[tokio::test]
async fn test_eleventh_history_entry_evicts_the_oldest() {
    let seeded_history: Vec<HistoryEntry> = (0..10)
        .map(|i| {
            HistoryEntry::new(
                format!("Item {i}"),
                format!("u{i}"),
                Assessment::new(5.0, Scores::uniform(5.0)),
            )
        })
        .collect();
    let oldest_url = seeded_history[9].url.clone();
    let mut seeded = StateValues::new();
    seeded.insert(StateKey::History, serde_json::to_value(&seeded_history).unwrap());
    let store = Arc::new(InMemoryStateStore::with_values(seeded));
    let harness = Harness::with_store(store, ScriptedClient::always(Ok(analysis_json(8.0, 1.0))));
    harness.orchestrator.set_credential(TEST_KEY).await.unwrap();

    harness
        .orchestrator
        .analyze_current_page(&extractor("Newest", "u-new"))
        .await
        .unwrap();

    let history: Vec<HistoryEntry> = stored(&harness.store, StateKey::History).await.unwrap();
    assert_eq!(history.len(), 10);
    assert_eq!(history[0].url, "u-new");
    assert_eq!(history[1].url, "u0");
    assert!(history.iter().all(|e| e.url != oldest_url));
}

#[tokio::test]
async fn test_concurrent_cart_adds_are_not_lost() {
    let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new());
    let state = Arc::new(StateService::new(store));
    let cart = Arc::new(CartService::new(Arc::clone(&state)));

    let entry = |url: &str| CartEntry::new("Item", url, Assessment::new(8.0, Scores::uniform(8.0)));
    let (a, b) = tokio::join!(cart.add(entry("u1")), cart.add(entry("u2")));
    a.unwrap();
    b.unwrap();

    let entries = cart.list().await.unwrap();
    assert_eq!(entries.len(), 2);
    let mut urls: Vec<_> = entries.iter().map(|e| e.url.as_str()).collect();
    urls.sort_unstable();
    assert_eq!(urls, vec!["u1", "u2"]);
}

#[tokio::test]
async fn test_remove_out_of_range_index() {
    let harness = Harness::new(ScriptedClient::always(Ok(analysis_json(8.0, 1.0))));

    let err = harness.orchestrator.remove_cart_entry(0).await.unwrap_err();

    assert_eq!(err, EcoError::IndexOutOfRange { index: 0, len: 0 });
    assert_eq!(harness.renderer.errors(), vec![err]);
}

#[tokio::test]
async fn test_remove_and_clear_cart() {
    let harness = Harness::with_credential(ScriptedClient::always(Ok(analysis_json(8.0, 2.0)))).await;
    for (title, url) in [("A", "u1"), ("B", "u2")] {
        harness
            .orchestrator
            .analyze_current_page(&extractor(title, url))
            .await
            .unwrap();
        harness.orchestrator.add_last_to_cart().await.unwrap();
    }

    let removed = harness.orchestrator.remove_cart_entry(0).await.unwrap();
    assert_eq!(removed.url, "u1");
    let cart: Vec<CartEntry> = stored(&harness.store, StateKey::Cart).await.unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].url, "u2");

    harness.orchestrator.clear_cart().await.unwrap();
    assert!(harness.orchestrator.show_cart().await.unwrap().is_empty());
    assert!(harness.renderer.notices().contains(&"Cart cleared.".to_string()));
    // Points survive a cart clear.
    assert_eq!(stored::<u64>(&harness.store, StateKey::RewardsPoints).await, Some(30));
}

#[tokio::test]
async fn test_credential_lifecycle() {
    let harness = Harness::new(ScriptedClient::always(Ok(analysis_json(8.0, 1.0))));

    assert_eq!(
        harness.orchestrator.set_credential("   ").await.unwrap_err(),
        EcoError::InvalidCredential
    );
    assert_eq!(harness.orchestrator.credential_status().await.unwrap(), None);

    harness
        .orchestrator
        .set_credential("  sk-ant-api03-abcdefwxyz \n")
        .await
        .unwrap();
    assert_eq!(
        stored::<String>(&harness.store, StateKey::Credential).await.as_deref(),
        Some("sk-ant-api03-abcdefwxyz")
    );
    assert_eq!(
        harness.orchestrator.credential_status().await.unwrap().as_deref(),
        Some("sk-ant-…wxyz")
    );

    harness.orchestrator.clear_credential().await.unwrap();
    assert_eq!(harness.orchestrator.credential_status().await.unwrap(), None);
    let err = harness
        .orchestrator
        .analyze_current_page(&extractor("Tee", "u1"))
        .await
        .unwrap_err();
    assert_eq!(err, EcoError::MissingCredential);
}
