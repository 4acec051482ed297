//! Handover decision engine for ransim
//!
//! Drives per-UE decision cycles on top of the network state manager: the
//! coverage-loss override, the ML-assisted path behind the classifier
//! boundary, and the rule-based A3 fallback. Every cycle emits a structured
//! decision trace and updates the engine counters.

pub mod classifier;
pub mod engine;
pub mod monitor;
pub mod trace;

pub use classifier::{
    ClassifierError, ClassifierResponse, FeatureMap, FeatureSchema, FeatureSpec,
    HandoverClassifier, QosCompliance,
};
pub use engine::{EngineConfig, HandoverDecision, HandoverEngine};
pub use monitor::{retry_with_backoff, spawn_supervisor, MonitorEvent, RetryPolicy};
pub use trace::{CounterSnapshot, DecisionOutcome, DecisionTrace, EngineCounters};
