//! Composable link-metrics façade
//!
//! Drives the RLF detector, throughput calculator and interruption tracker
//! from one SINR stream and returns a single structured result per
//! observation. Keeps the detectors synchronized on handovers.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use ransim_common::config::{
    InterruptionConfig, RlfConfig, SimulationConfig, ThroughputConfig,
};
use ransim_common::sim_time::SimTime;

use crate::interruption::HandoverInterruptionTracker;
use crate::rlf::RlfDetector;
use crate::throughput::ThroughputCalculator;

/// Configuration for the collector and its three trackers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsConfig {
    pub rlf: RlfConfig,
    pub throughput: ThroughputConfig,
    pub interruption: InterruptionConfig,
}

impl From<&SimulationConfig> for MetricsConfig {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            rlf: config.rlf,
            throughput: config.throughput,
            interruption: config.interruption,
        }
    }
}

/// Per-observation link state for one UE.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkMetrics {
    pub throughput_mbps: f64,
    pub is_rlf: bool,
    pub is_interruption: bool,
}

/// Population-wide aggregate view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSummary {
    /// UEs with at least one link observation
    pub ue_count: usize,
    pub total_rlf_count: u64,
    pub total_handover_count: u64,
    pub total_interruption_s: f64,
    /// Mean of each UE's most recent throughput observation
    pub mean_throughput_mbps: f64,
}

/// Façade over the three per-UE trackers.
pub struct MetricsCollector {
    rlf: RlfDetector,
    throughput: ThroughputCalculator,
    interruption: HandoverInterruptionTracker,
    last_throughput: Mutex<HashMap<i32, f64>>,
}

impl MetricsCollector {
    pub fn new(config: MetricsConfig) -> Self {
        Self {
            rlf: RlfDetector::new(config.rlf),
            throughput: ThroughputCalculator::new(config.throughput),
            interruption: HandoverInterruptionTracker::new(config.interruption),
            last_throughput: Mutex::new(HashMap::new()),
        }
    }

    fn lock_throughput(&self) -> MutexGuard<'_, HashMap<i32, f64>> {
        self.last_throughput
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Feeds one SINR observation for a UE and returns the combined link
    /// state. RLF checks are suppressed while an interruption window is
    /// active; a UE cannot fail mid-handover.
    pub fn update(&self, ue_id: i32, sinr_db: f64, now: SimTime) -> LinkMetrics {
        let is_interruption = self.interruption.is_in_interruption(ue_id, now);
        let is_rlf = if is_interruption {
            false
        } else {
            self.rlf.check_rlf(ue_id, sinr_db, now)
        };
        let throughput_mbps = self.throughput.throughput_mbps(sinr_db, is_interruption);
        self.lock_throughput().insert(ue_id, throughput_mbps);
        LinkMetrics {
            throughput_mbps,
            is_rlf,
            is_interruption,
        }
    }

    /// Records a handover: opens the interruption window and resets the
    /// UE's RLF timer.
    pub fn record_handover(&self, ue_id: i32, now: SimTime) {
        self.interruption.record_handover(ue_id, now);
        self.rlf.on_handover(ue_id);
    }

    /// Whether the UE is inside an active interruption window.
    pub fn is_in_interruption(&self, ue_id: i32, now: SimTime) -> bool {
        self.interruption.is_in_interruption(ue_id, now)
    }

    /// Cumulative RLF count for one UE.
    pub fn rlf_count(&self, ue_id: i32) -> u64 {
        self.rlf.rlf_count(ue_id)
    }

    /// Number of handovers recorded for one UE.
    pub fn handover_count(&self, ue_id: i32) -> u64 {
        self.interruption.handover_count(ue_id)
    }

    /// Drops every tracker's state for a UE.
    pub fn remove_ue(&self, ue_id: i32) {
        self.rlf.remove_ue(ue_id);
        self.interruption.remove_ue(ue_id);
        self.lock_throughput().remove(&ue_id);
    }

    /// Population-wide aggregates.
    pub fn summary(&self) -> MetricsSummary {
        let throughputs = self.lock_throughput();
        let ue_count = throughputs.len();
        let mean_throughput_mbps = if ue_count == 0 {
            0.0
        } else {
            throughputs.values().sum::<f64>() / ue_count as f64
        };
        MetricsSummary {
            ue_count,
            total_rlf_count: self.rlf.total_rlf_count(),
            total_handover_count: self.interruption.total_handover_count(),
            total_interruption_s: self.interruption.population_interruption_s(),
            mean_throughput_mbps,
        }
    }
}
