//! Persisted network snapshots
//!
//! A snapshot captures exactly the state needed for restart continuity:
//! UE positions, connectivity and in-flight A3 timers, plus the antenna
//! records. Trajectory and QoS histories are deliberately not persisted.

use serde::{Deserialize, Serialize};

use ransim_antenna::Antenna;
use ransim_common::error::Error;
use ransim_common::sim_time::SimTime;
use ransim_common::types::Vector3;

use crate::a3::A3Timer;

/// Restartable view of one UE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UeSnapshot {
    pub id: i32,
    pub position: Vector3,
    pub speed_mps: f64,
    pub connected_antenna: Option<i32>,
    #[serde(default)]
    pub a3: A3Timer,
}

/// Full network state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub ues: Vec<UeSnapshot>,
    pub antennas: Vec<Antenna>,
}

impl NetworkSnapshot {
    /// Parses a snapshot from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serializes the snapshot to a YAML string.
    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }
}
