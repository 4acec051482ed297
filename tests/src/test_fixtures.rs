//! Test fixtures and configuration helpers
//!
//! Canonical topologies plus mock classifier collaborators shared by the
//! integration scenarios.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use ransim_antenna::{Antenna, PathLossModel};
use ransim_common::types::Vector3;
use ransim_handover::{ClassifierError, ClassifierResponse, FeatureMap, HandoverClassifier};
use ransim_state::{NetworkStateManager, StateConfig};

/// Spacing between cells in the canonical topologies (m).
pub const CELL_SPACING_M: f64 = 200.0;

/// RSRP a midway UE sees from the serving cell of [`two_cell_state`] (dBm).
pub const MIDWAY_RSRP_SERVING_DBM: f64 = -80.0;

/// RSRP a midway UE sees from the target cell of [`two_cell_state`] (dBm).
pub const MIDWAY_RSRP_TARGET_DBM: f64 = -76.0;

fn pico(id: i32, x: f64, tx_power_dbm: f64) -> Antenna {
    Antenna::new(
        id,
        Vector3::new(x, 0.0, 0.0),
        2.6e9,
        tx_power_dbm,
        PathLossModel::Pico,
        300.0,
    )
}

/// Two pico cells 200 m apart at 2.6 GHz. A UE at x = 100 m sees
/// [`MIDWAY_RSRP_SERVING_DBM`] from cell 1 and [`MIDWAY_RSRP_TARGET_DBM`]
/// from cell 2: a 4 dB gap that clears the default 3 dB hysteresis.
pub fn two_cell_state() -> Arc<NetworkStateManager> {
    two_cell_state_with(StateConfig::default())
}

pub fn two_cell_state_with(config: StateConfig) -> Arc<NetworkStateManager> {
    let state = Arc::new(NetworkStateManager::new(config));
    state.add_antenna(pico(1, 0.0, 0.75)).expect("empty registry");
    state
        .add_antenna(pico(2, CELL_SPACING_M, 4.75))
        .expect("empty registry");
    state
}

/// `cells` equal-power pico cells along the x axis at [`CELL_SPACING_M`]
/// spacing, ids starting at 0. Crossing each midpoint flips the best cell.
pub fn corridor_state(cells: usize) -> Arc<NetworkStateManager> {
    let state = Arc::new(NetworkStateManager::new(StateConfig::default()));
    for id in 0..cells {
        state
            .add_antenna(pico(id as i32, id as f64 * CELL_SPACING_M, 0.75))
            .expect("distinct ids");
    }
    state
}

/// Always returns the same prediction.
pub struct StaticClassifier {
    pub response: ClassifierResponse,
}

impl StaticClassifier {
    pub fn target(antenna_id: i32, confidence: f64) -> Self {
        Self {
            response: ClassifierResponse {
                antenna_id: antenna_id.to_string(),
                confidence,
                qos_compliance: None,
            },
        }
    }
}

#[async_trait]
impl HandoverClassifier for StaticClassifier {
    async fn predict(
        &self,
        _features: &FeatureMap,
    ) -> Result<ClassifierResponse, ClassifierError> {
        Ok(self.response.clone())
    }
}

/// Always fails with a connection error.
pub struct FailingClassifier;

#[async_trait]
impl HandoverClassifier for FailingClassifier {
    async fn predict(
        &self,
        _features: &FeatureMap,
    ) -> Result<ClassifierResponse, ClassifierError> {
        Err(ClassifierError::Connection("connection refused".into()))
    }
}

/// Sleeps before answering, for timeout scenarios.
pub struct SlowClassifier {
    pub delay_ms: u64,
    pub response: ClassifierResponse,
}

#[async_trait]
impl HandoverClassifier for SlowClassifier {
    async fn predict(
        &self,
        _features: &FeatureMap,
    ) -> Result<ClassifierResponse, ClassifierError> {
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        Ok(self.response.clone())
    }
}

/// Fails the first `failures` calls, then answers like [`StaticClassifier`].
pub struct FlakyClassifier {
    pub failures: u32,
    pub response: ClassifierResponse,
    calls: AtomicU32,
}

impl FlakyClassifier {
    pub fn new(failures: u32, antenna_id: i32, confidence: f64) -> Self {
        Self {
            failures,
            response: ClassifierResponse {
                antenna_id: antenna_id.to_string(),
                confidence,
                qos_compliance: None,
            },
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HandoverClassifier for FlakyClassifier {
    async fn predict(
        &self,
        _features: &FeatureMap,
    ) -> Result<ClassifierResponse, ClassifierError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(ClassifierError::Connection(format!(
                "transient failure {call}"
            )))
        } else {
            Ok(self.response.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ransim_common::sim_time::SimTime;

    #[test]
    fn test_two_cell_geometry() {
        let state = two_cell_state();
        state.update_ue_position(1, Vector3::new(100.0, 0.0, 0.0), 0.0, SimTime::ZERO);
        let features = state.get_feature_vector(1).unwrap();
        let cell1 = features
            .neighbors
            .iter()
            .find(|n| n.antenna_id == 1)
            .unwrap();
        let cell2 = features
            .neighbors
            .iter()
            .find(|n| n.antenna_id == 2)
            .unwrap();
        assert!((cell1.rsrp_dbm - MIDWAY_RSRP_SERVING_DBM).abs() < 0.01);
        assert!((cell2.rsrp_dbm - MIDWAY_RSRP_TARGET_DBM).abs() < 0.01);
    }

    #[test]
    fn test_corridor_ids_and_positions() {
        let state = corridor_state(4);
        assert_eq!(state.antenna_ids(), vec![0, 1, 2, 3]);
        let last = state.get_antenna(3).unwrap();
        assert!((last.position.x - 600.0).abs() < 1e-9);
    }
}
