//! Handover interruption tracking
//!
//! Every handover opens a fixed-duration service gap for the UE. The
//! tracker remembers recent windows in a bounded per-UE queue, accumulates
//! total interruption time and counts handovers.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use ransim_common::config::InterruptionConfig;
use ransim_common::sim_time::SimTime;

#[derive(Debug, Default)]
struct InterruptionState {
    /// End of the currently active window, if any
    active_until: Option<SimTime>,
    /// Recent (start, end) windows, bounded
    windows: VecDeque<(SimTime, SimTime)>,
    /// Accumulated interruption time in seconds
    total_interruption_s: f64,
    /// Number of handovers recorded for this UE
    handover_count: u64,
}

/// Thread-safe interruption tracker, state keyed by UE id.
pub struct HandoverInterruptionTracker {
    config: InterruptionConfig,
    states: Mutex<HashMap<i32, InterruptionState>>,
}

impl HandoverInterruptionTracker {
    pub fn new(config: InterruptionConfig) -> Self {
        Self {
            config,
            states: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i32, InterruptionState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens an interruption window at `now` and counts the handover.
    /// Overlapping windows merge; accumulated time never double-counts the
    /// overlap.
    pub fn record_handover(&self, ue_id: i32, now: SimTime) {
        let duration_s = self.config.duration_ms / 1000.0;
        let end = now + duration_s;
        let mut states = self.lock();
        let state = states.entry(ue_id).or_default();

        state.handover_count += 1;
        match state.active_until {
            Some(active_end) if now < active_end => {
                if end > active_end {
                    state.total_interruption_s += end.elapsed_since(active_end);
                    state.active_until = Some(end);
                }
            }
            _ => {
                state.total_interruption_s += duration_s;
                state.active_until = Some(end);
            }
        }

        if state.windows.len() >= self.config.max_windows_per_ue {
            state.windows.pop_front();
        }
        state.windows.push_back((now, end));
    }

    /// Whether the UE is inside an active interruption window at `now`.
    pub fn is_in_interruption(&self, ue_id: i32, now: SimTime) -> bool {
        self.lock()
            .get(&ue_id)
            .and_then(|state| state.active_until)
            .map_or(false, |end| now < end)
    }

    /// Accumulated interruption time for one UE in seconds.
    pub fn total_interruption_s(&self, ue_id: i32) -> f64 {
        self.lock()
            .get(&ue_id)
            .map_or(0.0, |state| state.total_interruption_s)
    }

    /// Number of handovers recorded for one UE.
    pub fn handover_count(&self, ue_id: i32) -> u64 {
        self.lock()
            .get(&ue_id)
            .map_or(0, |state| state.handover_count)
    }

    /// Number of handovers recorded across the population.
    pub fn total_handover_count(&self) -> u64 {
        self.lock().values().map(|state| state.handover_count).sum()
    }

    /// Accumulated interruption time across the population in seconds.
    pub fn population_interruption_s(&self) -> f64 {
        self.lock()
            .values()
            .map(|state| state.total_interruption_s)
            .sum()
    }

    /// Number of remembered windows for one UE.
    pub fn window_count(&self, ue_id: i32) -> usize {
        self.lock().get(&ue_id).map_or(0, |state| state.windows.len())
    }

    /// Drops a UE's tracker state. Returns whether anything was removed.
    pub fn remove_ue(&self, ue_id: i32) -> bool {
        self.lock().remove(&ue_id).is_some()
    }
}
