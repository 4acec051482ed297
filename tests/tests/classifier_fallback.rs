//! Classifier degradation scenarios
//!
//! The ML path must never be load-bearing: every failure mode falls back
//! to the rule-based candidate, timeouts respect their budget, and the A3
//! timer survives the candidate source flipping mid-episode.

use std::sync::Arc;
use std::time::Instant;

use ransim_common::sim_time::SimTime;
use ransim_common::types::Vector3;
use ransim_handover::{
    retry_with_backoff, ClassifierResponse, DecisionOutcome, EngineConfig, HandoverEngine,
    RetryPolicy,
};
use ransim_state::DecisionMethod;
use ransim_tests::{
    init_test_logging, two_cell_state, FailingClassifier, FlakyClassifier, SlowClassifier,
    StaticClassifier,
};
use tokio::sync::mpsc;

fn ml_engine(
    state: &Arc<ransim_state::NetworkStateManager>,
    classifier: Arc<dyn ransim_handover::HandoverClassifier>,
) -> HandoverEngine {
    let mut config = EngineConfig::default();
    config.classifier.enabled = true;
    HandoverEngine::new(Arc::clone(state), config).with_classifier(classifier)
}

fn attach_midway(state: &ransim_state::NetworkStateManager) {
    state.update_ue_position(7, Vector3::new(100.0, 0.0, 0.0), 3.0, SimTime::ZERO);
    state.connect_ue(7, 1).unwrap();
}

/// While the classifier is down the engine keeps deciding on rules; when
/// it recovers mid-episode the same A3 timer completes under ML control.
#[tokio::test]
async fn test_flaky_classifier_degrades_then_recovers() {
    init_test_logging();

    let state = two_cell_state();
    attach_midway(&state);
    let flaky = Arc::new(FlakyClassifier::new(2, 2, 0.9));
    let engine = ml_engine(&state, flaky.clone());

    let first = engine.decide(7, SimTime::ZERO).await.unwrap();
    assert!(first.trace.fell_back);
    assert_eq!(first.trace.method, DecisionMethod::A3);
    assert_eq!(first.trace.candidate, Some(2));

    let second = engine.decide(7, SimTime::from_secs(0.5)).await.unwrap();
    assert!(second.trace.fell_back);
    assert!(second.event.is_none());

    // Third call reaches the recovered model; the timer started at t=0
    // fires now because the target never changed
    let third = engine.decide(7, SimTime::from_secs(1.0)).await.unwrap();
    assert!(!third.trace.fell_back);
    assert_eq!(third.outcome, DecisionOutcome::MlAssisted);
    let event = third.event.expect("episode completes on recovery");
    assert_eq!(event.method, DecisionMethod::Ml);
    assert_eq!(event.confidence, Some(0.9));
    assert_eq!(event.to_cell, 2);

    assert_eq!(flaky.calls(), 3);
    let counters = engine.counters();
    assert_eq!(counters.decisions, 3);
    assert_eq!(counters.fallbacks, 2);
    assert_eq!(counters.ml_predictions, 1);
    assert_eq!(counters.handovers, 1);
}

/// A hung classifier may cost at most the configured timeout, never the
/// whole tick.
#[tokio::test]
async fn test_timeout_budget_is_respected() {
    init_test_logging();

    let state = two_cell_state();
    attach_midway(&state);
    let mut config = EngineConfig::default();
    config.classifier.enabled = true;
    config.classifier.timeout_ms = 30;
    let engine = HandoverEngine::new(state.clone(), config).with_classifier(Arc::new(
        SlowClassifier {
            delay_ms: 2000,
            response: ClassifierResponse {
                antenna_id: "2".into(),
                confidence: 0.9,
                qos_compliance: None,
            },
        },
    ));

    let started = Instant::now();
    let decision = engine.decide(7, SimTime::ZERO).await.unwrap();
    assert!(decision.trace.fell_back);
    assert!(
        started.elapsed().as_millis() < 500,
        "decision must not wait for the hung classifier"
    );
}

/// Every classifier failure mode lands on the same rule-based candidate.
#[tokio::test]
async fn test_all_failure_modes_fall_back_to_rule_based() {
    init_test_logging();

    let classifiers: Vec<Arc<dyn ransim_handover::HandoverClassifier>> = vec![
        Arc::new(FailingClassifier),
        // Unknown cell id
        Arc::new(StaticClassifier::target(99, 0.9)),
        // Confidence below the 0.8 minimum
        Arc::new(StaticClassifier::target(2, 0.1)),
    ];

    for classifier in classifiers {
        let state = two_cell_state();
        attach_midway(&state);
        let engine = ml_engine(&state, classifier);
        let decision = engine.decide(7, SimTime::ZERO).await.unwrap();
        assert!(decision.trace.fell_back);
        assert_eq!(decision.trace.method, DecisionMethod::A3);
        assert_eq!(decision.trace.candidate, Some(2));
        assert_eq!(engine.counters().fallbacks, 1);
    }
}

/// Best-effort re-collection through the retry monitor: bounded attempts,
/// each failure reported, terminal give-up surfaced to the caller.
#[tokio::test]
async fn test_monitor_reports_bounded_retries() {
    init_test_logging();

    let state = two_cell_state();
    let engine = Arc::new(HandoverEngine::new(state, EngineConfig::default()));
    let policy = RetryPolicy {
        max_retries: 2,
        initial_backoff_ms: 1,
        max_backoff_ms: 4,
    };
    let (tx, mut rx) = mpsc::channel(16);

    // UE 42 never exists, so every attempt fails with NotFound
    let result = retry_with_backoff("decision-sweep", policy, &tx, || {
        let engine = Arc::clone(&engine);
        async move { engine.decide(42, SimTime::ZERO).await.map(|_| ()) }
    })
    .await;

    assert!(result.unwrap_err().is_not_found());
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 3);
    assert!(events[0].will_retry);
    assert!(!events[2].will_retry);
    assert!(events[0].error.contains("not found"));
}
