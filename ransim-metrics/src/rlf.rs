//! Radio link failure detection
//!
//! A per-UE timer arms when SINR first drops below the configured threshold
//! and declares an RLF once the condition has been sustained for the
//! configured duration. Each sustained episode fires at most once; recovery
//! above the threshold re-arms the detector.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::info;

use ransim_common::config::RlfConfig;
use ransim_common::sim_time::SimTime;

#[derive(Debug, Default, Clone, Copy)]
struct RlfState {
    /// When SINR first went below threshold in the current episode
    below_since: Option<SimTime>,
    /// Whether the current episode already produced a failure
    fired: bool,
    /// Cumulative RLF count for this UE
    rlf_count: u64,
}

/// Thread-safe RLF detector, state keyed by UE id.
pub struct RlfDetector {
    config: RlfConfig,
    states: Mutex<HashMap<i32, RlfState>>,
}

impl RlfDetector {
    pub fn new(config: RlfConfig) -> Self {
        Self {
            config,
            states: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i32, RlfState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Feeds one SINR observation. Returns true exactly once per sustained
    /// below-threshold episode, after `failure_duration_s` has elapsed.
    pub fn check_rlf(&self, ue_id: i32, sinr_db: f64, now: SimTime) -> bool {
        let mut states = self.lock();
        let state = states.entry(ue_id).or_default();

        if sinr_db >= self.config.sinr_threshold_db {
            // Recovery cancels the pending timer and re-arms the episode
            state.below_since = None;
            state.fired = false;
            return false;
        }

        match state.below_since {
            None => {
                state.below_since = Some(now);
                false
            }
            Some(since) => {
                if !state.fired && now.elapsed_since(since) >= self.config.failure_duration_s {
                    state.fired = true;
                    state.rlf_count += 1;
                    info!(ue_id, sinr_db, "radio link failure declared");
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Cancels any pending timer after a handover; the new link starts a
    /// fresh episode.
    pub fn on_handover(&self, ue_id: i32) {
        let mut states = self.lock();
        if let Some(state) = states.get_mut(&ue_id) {
            state.below_since = None;
            state.fired = false;
        }
    }

    /// Cumulative RLF count for one UE (0 if unknown).
    pub fn rlf_count(&self, ue_id: i32) -> u64 {
        self.lock().get(&ue_id).map_or(0, |state| state.rlf_count)
    }

    /// Cumulative RLF count across the population.
    pub fn total_rlf_count(&self) -> u64 {
        self.lock().values().map(|state| state.rlf_count).sum()
    }

    /// Drops a UE's detector state. Returns whether anything was removed.
    pub fn remove_ue(&self, ue_id: i32) -> bool {
        self.lock().remove(&ue_id).is_some()
    }
}
