//! Handover event records

use serde::{Deserialize, Serialize};

use ransim_common::sim_time::SimTime;

/// How a handover decision was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionMethod {
    /// Rule-based A3 measurement event
    A3,
    /// Classifier-assisted selection
    Ml,
}

impl std::fmt::Display for DecisionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionMethod::A3 => write!(f, "a3"),
            DecisionMethod::Ml => write!(f, "ml"),
        }
    }
}

/// Immutable record of one completed handover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoverEvent {
    pub ue_id: i32,
    /// Previous serving cell; None when the UE was unattached
    pub from_cell: Option<i32>,
    pub to_cell: i32,
    pub timestamp: SimTime,
    pub method: DecisionMethod,
    /// Classifier confidence, when the decision was ML-assisted
    pub confidence: Option<f64>,
    /// Whether the handover was forced by the coverage-loss override
    pub coverage_loss: bool,
}
