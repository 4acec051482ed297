//! Concurrent network state manager
//!
//! Single source of truth for UE and antenna registries, feature-vector
//! assembly and the per-UE A3 handover machine. One mutex guards the whole
//! inner state; every public method takes `&self`, and a UE's connectivity
//! never changes outside a critical section.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use ransim_antenna::Antenna;
use ransim_common::config::{A3Config, HistoryConfig, SimulationConfig};
use ransim_common::error::{Error, Result};
use ransim_common::sim_time::SimTime;
use ransim_common::types::Vector3;

use crate::a3::A3Outcome;
use crate::event::{DecisionMethod, HandoverEvent};
use crate::qos::{QoSMeasurement, QosSummary};
use crate::snapshot::{NetworkSnapshot, UeSnapshot};
use crate::ue::UeState;

/// Configuration slice consumed by the manager.
#[derive(Debug, Clone, Copy)]
pub struct StateConfig {
    pub a3: A3Config,
    pub history: HistoryConfig,
    /// Bandwidth used for the thermal-noise term of SINR (Hz)
    pub bandwidth_hz: f64,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            a3: A3Config::default(),
            history: HistoryConfig::default(),
            bandwidth_hz: 2.0e7,
        }
    }
}

impl From<&SimulationConfig> for StateConfig {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            a3: config.a3,
            history: config.history,
            bandwidth_hz: config.throughput.bandwidth_hz,
        }
    }
}

/// RF metrics of one cell as seen from a UE position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NeighborMetrics {
    pub antenna_id: i32,
    pub rsrp_dbm: f64,
    pub sinr_db: f64,
    pub distance_m: f64,
}

/// Everything a decision needs to know about one UE, assembled atomically.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureVector {
    pub ue_id: i32,
    pub position: Vector3,
    pub speed_mps: f64,
    pub serving_cell: Option<i32>,
    /// Every cell's metrics, sorted by RSRP descending
    pub neighbors: Vec<NeighborMetrics>,
    pub qos: Option<QosSummary>,
}

impl FeatureVector {
    /// Metrics of the serving cell, if attached and registered.
    pub fn serving_metrics(&self) -> Option<&NeighborMetrics> {
        let serving = self.serving_cell?;
        self.neighbors.iter().find(|n| n.antenna_id == serving)
    }

    /// Strongest cell other than the serving one.
    pub fn best_neighbor(&self) -> Option<&NeighborMetrics> {
        self.neighbors
            .iter()
            .find(|n| Some(n.antenna_id) != self.serving_cell)
    }
}

#[derive(Default)]
struct Inner {
    ues: HashMap<i32, UeState>,
    antennas: HashMap<i32, Antenna>,
    history: VecDeque<HandoverEvent>,
    /// Monotonic count of applied handovers; survives history pruning
    total_handovers: u64,
}

/// Thread-safe owner of the network state.
pub struct NetworkStateManager {
    config: StateConfig,
    inner: Mutex<Inner>,
}

impl NetworkStateManager {
    pub fn new(config: StateConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Antenna registry
    // ========================================================================

    /// Registers a cell. Duplicate ids are rejected.
    pub fn add_antenna(&self, antenna: Antenna) -> Result<()> {
        let mut inner = self.lock();
        if inner.antennas.contains_key(&antenna.id) {
            return Err(Error::Validation(format!(
                "antenna {} already registered",
                antenna.id
            )));
        }
        info!(antenna_id = antenna.id, "antenna registered");
        inner.antennas.insert(antenna.id, antenna);
        Ok(())
    }

    /// Updates a cell's load; the only mutable antenna field.
    pub fn update_antenna_load(&self, antenna_id: i32, load: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&load) {
            return Err(Error::Validation(format!(
                "load must be within [0, 1], got {load}"
            )));
        }
        let mut inner = self.lock();
        let antenna = inner
            .antennas
            .get_mut(&antenna_id)
            .ok_or_else(|| Error::antenna_not_found(antenna_id))?;
        antenna.current_load = load;
        Ok(())
    }

    pub fn antenna_ids(&self) -> Vec<i32> {
        let inner = self.lock();
        let mut ids: Vec<i32> = inner.antennas.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn get_antenna(&self, antenna_id: i32) -> Result<Antenna> {
        let inner = self.lock();
        inner
            .antennas
            .get(&antenna_id)
            .cloned()
            .ok_or_else(|| Error::antenna_not_found(antenna_id))
    }

    // ========================================================================
    // UE registry
    // ========================================================================

    /// Moves a UE, creating it on first sight.
    pub fn update_ue_position(&self, ue_id: i32, position: Vector3, speed_mps: f64, now: SimTime) {
        let mut inner = self.lock();
        let ue = inner.ues.entry(ue_id).or_insert_with(|| {
            debug!(ue_id, "ue created on first movement update");
            UeState::new(ue_id, position, speed_mps, &self.config.history)
        });
        ue.update_position(position, speed_mps, now);
    }

    /// Tears a UE down.
    pub fn remove_ue(&self, ue_id: i32) -> Result<()> {
        let mut inner = self.lock();
        inner
            .ues
            .remove(&ue_id)
            .map(|_| info!(ue_id, "ue removed"))
            .ok_or_else(|| Error::ue_not_found(ue_id))
    }

    /// Attaches a UE to a cell directly, resetting any A3 episode. Used for
    /// initial attachment, not for handovers.
    pub fn connect_ue(&self, ue_id: i32, antenna_id: i32) -> Result<()> {
        let mut inner = self.lock();
        if !inner.antennas.contains_key(&antenna_id) {
            return Err(Error::antenna_not_found(antenna_id));
        }
        let ue = inner
            .ues
            .get_mut(&ue_id)
            .ok_or_else(|| Error::ue_not_found(ue_id))?;
        ue.connected_antenna = Some(antenna_id);
        ue.a3.reset();
        info!(ue_id, antenna_id, "ue attached");
        Ok(())
    }

    pub fn ue_count(&self) -> usize {
        self.lock().ues.len()
    }

    pub fn ue_ids(&self) -> Vec<i32> {
        let inner = self.lock();
        let mut ids: Vec<i32> = inner.ues.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Cloned view of one UE's state.
    pub fn get_ue(&self, ue_id: i32) -> Result<UeState> {
        let inner = self.lock();
        inner
            .ues
            .get(&ue_id)
            .cloned()
            .ok_or_else(|| Error::ue_not_found(ue_id))
    }

    // ========================================================================
    // QoS ingestion
    // ========================================================================

    /// Validates and records a QoS measurement into the UE's window.
    pub fn record_qos(&self, ue_id: i32, measurement: QoSMeasurement) -> Result<()> {
        if let Err(err) = measurement.validate() {
            warn!(ue_id, %err, "rejecting qos measurement");
            return Err(err);
        }
        let mut inner = self.lock();
        let ue = inner
            .ues
            .get_mut(&ue_id)
            .ok_or_else(|| Error::ue_not_found(ue_id))?;
        ue.qos_mut().push(measurement);
        Ok(())
    }

    /// The UE's retained QoS window, oldest first.
    pub fn get_qos_history(&self, ue_id: i32) -> Result<Vec<QoSMeasurement>> {
        let inner = self.lock();
        let ue = inner
            .ues
            .get(&ue_id)
            .ok_or_else(|| Error::ue_not_found(ue_id))?;
        Ok(ue.qos().samples().copied().collect())
    }

    // ========================================================================
    // Feature vectors
    // ========================================================================

    /// Assembles the full RF + QoS picture for one UE under a single lock
    /// acquisition.
    pub fn get_feature_vector(&self, ue_id: i32) -> Result<FeatureVector> {
        let inner = self.lock();
        let ue = inner
            .ues
            .get(&ue_id)
            .ok_or_else(|| Error::ue_not_found(ue_id))?;

        let cells: Vec<&Antenna> = inner.antennas.values().collect();
        let mut neighbors = Vec::with_capacity(cells.len());
        for antenna in &cells {
            let interferers: Vec<&Antenna> = cells
                .iter()
                .filter(|other| other.id != antenna.id)
                .copied()
                .collect();
            neighbors.push(NeighborMetrics {
                antenna_id: antenna.id,
                rsrp_dbm: antenna.rsrp_dbm(&ue.position),
                sinr_db: antenna.sinr_db(&ue.position, &interferers, self.config.bandwidth_hz),
                distance_m: antenna.distance_to(&ue.position),
            });
        }
        neighbors.sort_by(|a, b| b.rsrp_dbm.total_cmp(&a.rsrp_dbm));

        Ok(FeatureVector {
            ue_id,
            position: ue.position,
            speed_mps: ue.speed_mps,
            serving_cell: ue.connected_antenna,
            neighbors,
            qos: ue.qos().summary(),
        })
    }

    // ========================================================================
    // Handover machinery
    // ========================================================================

    /// Runs one A3 evaluation toward `target_antenna_id` and applies the
    /// handover if the timer fires. Returns the event only on the firing
    /// evaluation; otherwise connectivity is left untouched.
    pub fn apply_handover_decision(
        &self,
        ue_id: i32,
        target_antenna_id: i32,
        method: DecisionMethod,
        confidence: Option<f64>,
        now: SimTime,
    ) -> Result<Option<HandoverEvent>> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let ue = inner
            .ues
            .get_mut(&ue_id)
            .ok_or_else(|| Error::ue_not_found(ue_id))?;
        let target = inner
            .antennas
            .get(&target_antenna_id)
            .ok_or_else(|| Error::antenna_not_found(target_antenna_id))?;

        // A serving cell that is unattached or missing from the registry
        // loses every comparison.
        let serving_rsrp = ue
            .connected_antenna
            .and_then(|id| inner.antennas.get(&id))
            .map_or(f64::NEG_INFINITY, |serving| serving.rsrp_dbm(&ue.position));
        let diff_db = target.rsrp_dbm(&ue.position) - serving_rsrp;

        let outcome = ue.a3.evaluate(diff_db, target_antenna_id, &self.config.a3, now);
        match outcome {
            A3Outcome::Started | A3Outcome::Restarted => {
                debug!(ue_id, target_antenna_id, diff_db, "a3 timer started");
                Ok(None)
            }
            A3Outcome::Canceled => {
                debug!(ue_id, target_antenna_id, diff_db, "a3 timer canceled");
                Ok(None)
            }
            A3Outcome::Idle | A3Outcome::Timing => Ok(None),
            A3Outcome::Fired => {
                let event = HandoverEvent {
                    ue_id,
                    from_cell: ue.connected_antenna,
                    to_cell: target_antenna_id,
                    timestamp: now,
                    method,
                    confidence,
                    coverage_loss: false,
                };
                ue.connected_antenna = Some(target_antenna_id);
                ue.push_event(event.clone());
                if inner.history.len() >= self.config.history.max_handover_events {
                    inner.history.pop_front();
                }
                inner.history.push_back(event.clone());
                inner.total_handovers += 1;
                info!(
                    ue_id,
                    from = ?event.from_cell,
                    to = event.to_cell,
                    method = %event.method,
                    "handover applied"
                );
                Ok(Some(event))
            }
        }
    }

    /// Switches a UE's serving cell immediately, bypassing the A3 timer.
    /// Used by the coverage-loss override; the event is flagged accordingly.
    pub fn force_handover(
        &self,
        ue_id: i32,
        target_antenna_id: i32,
        now: SimTime,
    ) -> Result<HandoverEvent> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if !inner.antennas.contains_key(&target_antenna_id) {
            return Err(Error::antenna_not_found(target_antenna_id));
        }
        let ue = inner
            .ues
            .get_mut(&ue_id)
            .ok_or_else(|| Error::ue_not_found(ue_id))?;

        let event = HandoverEvent {
            ue_id,
            from_cell: ue.connected_antenna,
            to_cell: target_antenna_id,
            timestamp: now,
            method: DecisionMethod::A3,
            confidence: None,
            coverage_loss: true,
        };
        ue.connected_antenna = Some(target_antenna_id);
        ue.a3.reset();
        ue.push_event(event.clone());
        if inner.history.len() >= self.config.history.max_handover_events {
            inner.history.pop_front();
        }
        inner.history.push_back(event.clone());
        inner.total_handovers += 1;
        warn!(
            ue_id,
            from = ?event.from_cell,
            to = event.to_cell,
            "coverage loss handover forced"
        );
        Ok(event)
    }

    /// The most recent `limit` handover events, oldest first.
    pub fn handover_history(&self, limit: usize) -> Vec<HandoverEvent> {
        let inner = self.lock();
        let skip = inner.history.len().saturating_sub(limit);
        inner.history.iter().skip(skip).cloned().collect()
    }

    /// Monotonic count of all applied handovers, unaffected by history
    /// pruning.
    pub fn handover_count(&self) -> u64 {
        self.lock().total_handovers
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Captures position, connectivity and A3 state for every UE plus the
    /// antenna registry.
    pub fn snapshot(&self) -> NetworkSnapshot {
        let inner = self.lock();
        let mut ues: Vec<UeSnapshot> = inner
            .ues
            .values()
            .map(|ue| UeSnapshot {
                id: ue.id,
                position: ue.position,
                speed_mps: ue.speed_mps,
                connected_antenna: ue.connected_antenna,
                a3: ue.a3,
            })
            .collect();
        ues.sort_by_key(|ue| ue.id);
        let mut antennas: Vec<Antenna> = inner.antennas.values().cloned().collect();
        antennas.sort_by_key(|antenna| antenna.id);
        NetworkSnapshot { ues, antennas }
    }

    /// Replaces the whole state with a snapshot. Histories and QoS windows
    /// start empty; the snapshot format does not carry them.
    pub fn restore(&self, snapshot: NetworkSnapshot) -> Result<()> {
        let mut inner = self.lock();
        inner.antennas = snapshot
            .antennas
            .into_iter()
            .map(|antenna| (antenna.id, antenna))
            .collect();
        inner.ues = snapshot
            .ues
            .into_iter()
            .map(|ue| {
                let mut state =
                    UeState::new(ue.id, ue.position, ue.speed_mps, &self.config.history);
                state.connected_antenna = ue.connected_antenna;
                state.a3 = ue.a3;
                (ue.id, state)
            })
            .collect();
        inner.history.clear();
        inner.total_handovers = 0;
        info!(
            ues = inner.ues.len(),
            antennas = inner.antennas.len(),
            "state restored from snapshot"
        );
        Ok(())
    }
}
