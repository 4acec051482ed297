//! End-to-end corridor walk scenarios
//!
//! Drives every crate together: per-tick position updates, channel fading,
//! engine decisions through the A3 machine, and link metrics, across a
//! corridor of pico cells.

use ransim_channel::ChannelModelManager;
use ransim_common::config::ChannelConfig;
use ransim_common::sim_time::SimTime;
use ransim_common::types::Vector3;
use ransim_handover::{DecisionOutcome, EngineConfig, HandoverEngine};
use ransim_metrics::{MetricsCollector, MetricsConfig};
use ransim_state::DecisionMethod;
use ransim_tests::{corridor_state, init_test_logging, two_cell_state};

const TICK_S: f64 = 0.1;
const SPEED_MPS: f64 = 10.0;

/// A UE walks a three-cell corridor at 10 m/s. Each boundary crossing must
/// produce exactly one handover after the hysteresis margin has held for
/// the full time-to-trigger, each handover opens one 50 ms service gap,
/// and the link never degrades into an RLF.
#[tokio::test]
async fn test_corridor_walk_hands_over_once_per_boundary() {
    init_test_logging();

    let state = corridor_state(3);
    let engine = HandoverEngine::new(state.clone(), EngineConfig::default());
    let collector = MetricsCollector::new(MetricsConfig::default());
    let channels = ChannelModelManager::new(ChannelConfig::default(), 0xC0FFEE);

    let ue = 7;
    state.update_ue_position(ue, Vector3::new(50.0, 0.0, 0.0), SPEED_MPS, SimTime::ZERO);
    state.connect_ue(ue, 0).unwrap();

    let mut events = Vec::new();
    let mut interrupted_ticks = 0;
    for k in 0..=300u32 {
        let now = SimTime::from_secs(f64::from(k) * TICK_S);
        let position = Vector3::new(50.0 + f64::from(k) * SPEED_MPS * TICK_S, 0.0, 0.0);
        state.update_ue_position(ue, position, SPEED_MPS, now);
        channels.update_ue(ue, position, SPEED_MPS, now);

        let decision = engine.decide(ue, now).await.unwrap();
        if let Some(event) = decision.event {
            collector.record_handover(ue, now);
            events.push(event);
        }

        let features = state.get_feature_vector(ue).unwrap();
        let sinr = features.serving_metrics().unwrap().sinr_db;
        let link = collector.update(ue, sinr, now);
        assert!(!link.is_rlf, "unexpected link failure at {now}");
        if link.is_interruption {
            assert_eq!(link.throughput_mbps, 0.0);
            interrupted_ticks += 1;
        } else {
            assert!(link.throughput_mbps > 0.0, "link should carry data at {now}");
        }
    }

    // One handover per boundary, in corridor order, all rule-based
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].from_cell, Some(0));
    assert_eq!(events[0].to_cell, 1);
    assert_eq!(events[1].from_cell, Some(1));
    assert_eq!(events[1].to_cell, 2);
    assert!(events
        .iter()
        .all(|e| e.method == DecisionMethod::A3 && !e.coverage_loss));
    // The 3 dB margin appears ~117 m in (t = 6.8 s) and ~318 m in
    // (t = 26.8 s); firing follows one second later
    assert!((events[0].timestamp.as_secs() - 7.8).abs() < 0.11);
    assert!((events[1].timestamp.as_secs() - 27.8).abs() < 0.11);

    assert_eq!(state.get_ue(ue).unwrap().connected_antenna, Some(2));
    assert_eq!(state.handover_count(), 2);

    let counters = engine.counters();
    assert_eq!(counters.decisions, 301);
    assert_eq!(counters.handovers, 2);
    assert_eq!(counters.coverage_loss_events, 0);
    assert_eq!(counters.fallbacks, 0);
    assert_eq!(counters.ml_predictions, 0);

    // Each handover interrupted exactly one tick
    assert_eq!(interrupted_ticks, 2);
    let summary = collector.summary();
    assert_eq!(summary.total_rlf_count, 0);
    assert_eq!(summary.total_handover_count, 2);
    assert!((summary.total_interruption_s - 0.1).abs() < 1e-9);

    // The fading processes ran the whole walk
    assert_eq!(channels.len(), 1);
    let stats = channels.shadowing_stats();
    assert_eq!(stats.count, 1);
    assert!(stats.mean_db.is_finite());
}

/// A UE stranded far outside its serving cell's padded radius is rescued
/// onto the nearest cell in a single cycle, bypassing the A3 timer.
#[tokio::test]
async fn test_coverage_loss_rescues_stranded_ue() {
    init_test_logging();

    let state = two_cell_state();
    let engine = HandoverEngine::new(state.clone(), EngineConfig::default());

    // Attached to cell 1 but 520 m out; the padded radius is 300 m x 1.2
    state.update_ue_position(7, Vector3::new(520.0, 0.0, 0.0), 25.0, SimTime::ZERO);
    state.connect_ue(7, 1).unwrap();

    let decision = engine.decide(7, SimTime::from_secs(0.1)).await.unwrap();
    assert_eq!(decision.outcome, DecisionOutcome::CoverageLoss);
    let event = decision.event.expect("override applies immediately");
    assert!(event.coverage_loss);
    assert_eq!(event.from_cell, Some(1));
    assert_eq!(event.to_cell, 2);
    assert_eq!(state.get_ue(7).unwrap().connected_antenna, Some(2));

    // Inside cell 2's radius the next cycle is an ordinary decision again
    let next = engine.decide(7, SimTime::from_secs(0.2)).await.unwrap();
    assert_ne!(next.outcome, DecisionOutcome::CoverageLoss);
    assert_eq!(engine.counters().coverage_loss_events, 1);
}

/// When the serving cell is itself the nearest one, the override still
/// emits a (re-anchoring) event rather than leaving coverage loss silent.
#[tokio::test]
async fn test_coverage_loss_reanchors_to_serving_when_nearest() {
    init_test_logging();

    let state = two_cell_state();
    let engine = HandoverEngine::new(state.clone(), EngineConfig::default());

    state.update_ue_position(7, Vector3::new(-600.0, 0.0, 0.0), 0.0, SimTime::ZERO);
    state.connect_ue(7, 1).unwrap();

    let decision = engine.decide(7, SimTime::ZERO).await.unwrap();
    assert_eq!(decision.outcome, DecisionOutcome::CoverageLoss);
    let event = decision.event.expect("override applies immediately");
    assert_eq!(event.from_cell, Some(1));
    assert_eq!(event.to_cell, 1);
    assert!(event.coverage_loss);
}
