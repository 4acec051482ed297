//! Network state management for ransim
//!
//! Owns every registry the simulator mutates at runtime: UEs with their
//! trajectories, QoS windows and A3 timers, the antenna registry, and the
//! bounded handover history. All shared access goes through
//! [`NetworkStateManager`], which also assembles per-UE feature vectors and
//! applies handover decisions.

pub mod a3;
pub mod event;
pub mod manager;
pub mod qos;
pub mod snapshot;
pub mod ue;

pub use a3::{A3Outcome, A3Timer};
pub use event::{DecisionMethod, HandoverEvent};
pub use manager::{FeatureVector, NeighborMetrics, NetworkStateManager, StateConfig};
pub use qos::{MetricStats, QoSMeasurement, QosSummary, QosWindow};
pub use snapshot::{NetworkSnapshot, UeSnapshot};
pub use ue::{TrajectorySample, UeState};
