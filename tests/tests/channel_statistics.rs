//! Statistical properties of the channel model over a UE population
//!
//! Population-level checks on the shadowing and fast-fading processes as
//! exposed through the channel manager.

use ransim_channel::ChannelModelManager;
use ransim_common::config::ChannelConfig;
use ransim_common::sim_time::SimTime;
use ransim_common::types::Vector3;
use ransim_tests::init_test_logging;

#[test]
fn test_shadowing_population_matches_sigma() {
    init_test_logging();

    let channels = ChannelModelManager::new(ChannelConfig::default(), 0x5EED);
    let position = Vector3::new(250.0, 130.0, 1.5);
    for ue in 0..4000 {
        channels.update_ue(ue, position, 0.0, SimTime::ZERO);
    }

    let stats = channels.shadowing_stats();
    assert_eq!(stats.count, 4000);
    // First draws are N(0, sigma^2) with sigma = 8 dB
    assert!(
        stats.mean_db.abs() < 0.5,
        "population mean {} should be near zero",
        stats.mean_db
    );
    assert!(
        (stats.stddev_db - 8.0).abs() < 1.2,
        "population stddev {} should be near 8 dB",
        stats.stddev_db
    );
}

#[test]
fn test_fading_mean_compensation_over_population() {
    init_test_logging();

    let channels = ChannelModelManager::new(ChannelConfig::default(), 0xFAD);
    let position = Vector3::new(40.0, 0.0, 1.5);
    let mut sum = 0.0;
    let count = 5000;
    for ue in 0..count {
        // Vehicular speed keeps the Doppler regime active
        let (_, fading) = channels.update_ue(ue, position, 30.0, SimTime::ZERO);
        sum += fading;
    }

    let mean = sum / f64::from(count);
    // Rayleigh mean compensation centers the loss on 0 dB
    assert!(
        mean.abs() < 0.3,
        "fading loss mean {mean} should be near 0 dB"
    );
}

#[test]
fn test_identical_seeds_reproduce_exactly() {
    init_test_logging();

    let first = ChannelModelManager::new(ChannelConfig::default(), 42);
    let second = ChannelModelManager::new(ChannelConfig::default(), 42);

    for ue in 0..3 {
        for step in 0..10 {
            let position = Vector3::new(step as f64 * 5.0, ue as f64 * 20.0, 1.5);
            let now = SimTime::from_secs(step as f64 * 0.5);
            let a = first.update_ue(ue, position, 8.0, now);
            let b = second.update_ue(ue, position, 8.0, now);
            assert_eq!(a, b, "seeded streams must match for ue {ue} step {step}");
        }
    }
}

#[test]
fn test_distinct_ues_get_decorrelated_streams() {
    init_test_logging();

    let channels = ChannelModelManager::new(ChannelConfig::default(), 42);
    let mut first = Vec::new();
    let mut second = Vec::new();
    for step in 0..10 {
        let position = Vector3::new(step as f64 * 5.0, 0.0, 1.5);
        let now = SimTime::from_secs(step as f64 * 0.5);
        first.push(channels.update_ue(1, position, 8.0, now));
        second.push(channels.update_ue(2, position, 8.0, now));
    }

    let diverged = first
        .iter()
        .zip(&second)
        .any(|(a, b)| (a.0 - b.0).abs() > 1e-9);
    assert!(diverged, "ue streams must not mirror each other");
}
