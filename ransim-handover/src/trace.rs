//! Decision traces and engine counters
//!
//! Every decision cycle emits exactly one [`DecisionTrace`], logged as a
//! single JSON line and mirrored into the lock-free [`EngineCounters`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::{info, warn};

use ransim_common::sim_time::SimTime;
use ransim_state::DecisionMethod;

/// Terminal state of one decision cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// No connectivity change this cycle
    NoOp,
    /// A3 timer fired on the rule-based candidate
    RuleBased,
    /// A3 timer fired on a validated ML candidate
    MlAssisted,
    /// Forced handover after leaving the serving cell's coverage
    CoverageLoss,
}

impl std::fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionOutcome::NoOp => write!(f, "no_op"),
            DecisionOutcome::RuleBased => write!(f, "rule_based"),
            DecisionOutcome::MlAssisted => write!(f, "ml_assisted"),
            DecisionOutcome::CoverageLoss => write!(f, "coverage_loss"),
        }
    }
}

/// Structured record of one decision cycle.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionTrace {
    pub ue_id: i32,
    pub timestamp: SimTime,
    pub outcome: DecisionOutcome,
    /// Which path produced the candidate, regardless of whether it fired
    pub method: DecisionMethod,
    pub from_cell: Option<i32>,
    /// Set only when connectivity actually changed this cycle
    pub to_cell: Option<i32>,
    /// Candidate fed to the A3 machine, if the cycle got that far
    pub candidate: Option<i32>,
    pub coverage_loss: bool,
    pub confidence: Option<f64>,
    /// True when the ML path was attempted and the rule-based candidate
    /// had to stand in
    pub fell_back: bool,
    pub serving_distance_m: Option<f64>,
}

impl DecisionTrace {
    /// A no-op skeleton; the engine fills in what each path learns.
    pub fn new(ue_id: i32, timestamp: SimTime) -> Self {
        Self {
            ue_id,
            timestamp,
            outcome: DecisionOutcome::NoOp,
            method: DecisionMethod::A3,
            from_cell: None,
            to_cell: None,
            candidate: None,
            coverage_loss: false,
            confidence: None,
            fell_back: false,
            serving_distance_m: None,
        }
    }

    /// Emits the trace as one JSON log line.
    pub fn log(&self) {
        match serde_json::to_string(self) {
            Ok(json) => info!(target: "ransim::decision", %json, "handover decision"),
            Err(err) => warn!(%err, "failed to serialize decision trace"),
        }
    }
}

/// Lock-free counters over all decision cycles.
#[derive(Debug, Default)]
pub struct EngineCounters {
    decisions: AtomicU64,
    handovers: AtomicU64,
    coverage_loss_events: AtomicU64,
    ml_predictions: AtomicU64,
    fallbacks: AtomicU64,
    no_ops: AtomicU64,
}

impl EngineCounters {
    pub fn record(&self, trace: &DecisionTrace) {
        self.decisions.fetch_add(1, Ordering::Relaxed);
        match trace.outcome {
            DecisionOutcome::NoOp => {
                self.no_ops.fetch_add(1, Ordering::Relaxed);
            }
            DecisionOutcome::CoverageLoss => {
                self.coverage_loss_events.fetch_add(1, Ordering::Relaxed);
            }
            DecisionOutcome::RuleBased | DecisionOutcome::MlAssisted => {}
        }
        if trace.to_cell.is_some() {
            self.handovers.fetch_add(1, Ordering::Relaxed);
        }
        if trace.method == DecisionMethod::Ml {
            self.ml_predictions.fetch_add(1, Ordering::Relaxed);
        }
        if trace.fell_back {
            self.fallbacks.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            decisions: self.decisions.load(Ordering::Relaxed),
            handovers: self.handovers.load(Ordering::Relaxed),
            coverage_loss_events: self.coverage_loss_events.load(Ordering::Relaxed),
            ml_predictions: self.ml_predictions.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            no_ops: self.no_ops.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub decisions: u64,
    pub handovers: u64,
    pub coverage_loss_events: u64,
    pub ml_predictions: u64,
    pub fallbacks: u64,
    pub no_ops: u64,
}
