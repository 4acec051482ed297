//! Concurrency suite for the shared registries
//!
//! Hammers the state manager, metrics trackers, channel manager and engine
//! from many threads on shared UE ids. Nothing may panic or deadlock, and
//! every counter must equal the exact sum of recorded operations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use ransim_channel::ChannelModelManager;
use ransim_common::config::ChannelConfig;
use ransim_common::sim_time::SimTime;
use ransim_common::types::Vector3;
use ransim_handover::{DecisionOutcome, EngineConfig, HandoverEngine};
use ransim_metrics::{MetricsCollector, MetricsConfig};
use ransim_state::QoSMeasurement;
use ransim_tests::{init_test_logging, two_cell_state};

const THREADS: usize = 10;
const OPS_PER_THREAD: usize = 100;
const SHARED_UES: i32 = 4;

#[test]
fn test_mixed_state_operations_keep_counters_exact() {
    init_test_logging();

    let state = two_cell_state();
    for ue in 0..SHARED_UES {
        state.update_ue_position(ue, Vector3::new(100.0, 0.0, 0.0), 1.0, SimTime::ZERO);
        state.connect_ue(ue, 1).unwrap();
    }

    let forced = Arc::new(AtomicU64::new(0));
    let qos_recorded = Arc::new(AtomicU64::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let state = state.clone();
            let forced = Arc::clone(&forced);
            let qos_recorded = Arc::clone(&qos_recorded);
            thread::spawn(move || {
                for k in 0..OPS_PER_THREAD {
                    let ue = (k as i32 + t as i32) % SHARED_UES;
                    let now = SimTime::from_secs(k as f64 * 0.001);
                    match k % 5 {
                        0 => {
                            let x = 100.0 + (k % 7) as f64;
                            state.update_ue_position(ue, Vector3::new(x, 0.0, 0.0), 1.0, now);
                        }
                        1 => {
                            let features = state.get_feature_vector(ue).unwrap();
                            assert_eq!(features.neighbors.len(), 2);
                        }
                        2 => {
                            let sample = QoSMeasurement {
                                timestamp: now,
                                latency_ms: 20.0,
                                jitter_ms: 2.0,
                                throughput_mbps: 35.0,
                                packet_loss_rate: 0.01,
                            };
                            state.record_qos(ue, sample).unwrap();
                            qos_recorded.fetch_add(1, Ordering::SeqCst);
                        }
                        3 => {
                            state.force_handover(ue, 2, now).unwrap();
                            forced.fetch_add(1, Ordering::SeqCst);
                        }
                        _ => {
                            let _ = state.handover_history(8);
                            let _ = state.get_qos_history(ue).unwrap();
                        }
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(state.ue_count(), SHARED_UES as usize);
    assert_eq!(state.handover_count(), forced.load(Ordering::SeqCst));

    let retained: u64 = (0..SHARED_UES)
        .map(|ue| state.get_qos_history(ue).unwrap().len() as u64)
        .sum();
    assert_eq!(retained, qos_recorded.load(Ordering::SeqCst));

    // Every UE ends attached to a registered cell
    for ue in 0..SHARED_UES {
        let connected = state.get_ue(ue).unwrap().connected_antenna.unwrap();
        assert!(state.get_antenna(connected).is_ok());
    }
}

#[test]
fn test_concurrent_rlf_and_handover_counters() {
    init_test_logging();

    let collector = Arc::new(MetricsCollector::new(MetricsConfig::default()));
    let handovers_per_thread = 10u64;

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let collector = Arc::clone(&collector);
            thread::spawn(move || {
                let own_ue = t as i32;
                // Sustained -10 dB: exactly one RLF per UE, at the 1 s mark
                for k in 0..=60 {
                    let now = SimTime::from_secs(k as f64 * 0.05);
                    let link = collector.update(own_ue, -10.0, now);
                    assert_eq!(link.throughput_mbps, 0.0);
                }
                // Handover recordings on one shared UE id
                for k in 0..handovers_per_thread {
                    let now = SimTime::from_secs(k as f64 + t as f64 * 0.01);
                    collector.record_handover(99, now);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for t in 0..THREADS {
        assert_eq!(collector.rlf_count(t as i32), 1);
    }
    assert_eq!(
        collector.handover_count(99),
        THREADS as u64 * handovers_per_thread
    );

    let summary = collector.summary();
    assert_eq!(summary.total_rlf_count, THREADS as u64);
    assert_eq!(summary.total_handover_count, THREADS as u64 * handovers_per_thread);
}

#[test]
fn test_concurrent_channel_updates_share_one_registry() {
    init_test_logging();

    let channels = Arc::new(ChannelModelManager::new(ChannelConfig::default(), 7));

    let handles: Vec<_> = (0..8)
        .map(|t: i32| {
            let channels = Arc::clone(&channels);
            thread::spawn(move || {
                for k in 0..200 {
                    let ue = k % 4;
                    let position = Vector3::new((k + t * 3) as f64, t as f64, 1.5);
                    let now = SimTime::from_secs(k as f64 * 0.1);
                    let (shadowing, fading) = channels.update_ue(ue, position, 12.0, now);
                    assert!(shadowing.is_finite());
                    assert!(fading.is_finite());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(channels.len(), 4);
    assert_eq!(channels.shadowing_stats().count, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_decisions_never_corrupt_connectivity() {
    init_test_logging();

    let state = two_cell_state();
    for ue in 0..SHARED_UES {
        state.update_ue_position(ue, Vector3::new(100.0, 0.0, 0.0), 1.0, SimTime::ZERO);
        // Serving the stronger cell: every cycle stays below hysteresis
        state.connect_ue(ue, 2).unwrap();
    }
    let engine = Arc::new(HandoverEngine::new(state.clone(), EngineConfig::default()));

    let mut tasks = Vec::new();
    for t in 0..8 {
        let engine = Arc::clone(&engine);
        tasks.push(tokio::spawn(async move {
            for k in 0..25 {
                let ue = (k + t) % SHARED_UES as usize;
                let now = SimTime::from_secs(k as f64 * 0.1);
                let decision = engine.decide(ue as i32, now).await.unwrap();
                assert_eq!(decision.outcome, DecisionOutcome::NoOp);
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let counters = engine.counters();
    assert_eq!(counters.decisions, 200);
    assert_eq!(counters.handovers, 0);
    assert_eq!(counters.no_ops, 200);
    for ue in 0..SHARED_UES {
        assert_eq!(state.get_ue(ue).unwrap().connected_antenna, Some(2));
    }
}
