//! Link-quality metrics tracking for ransim
//!
//! This crate provides the radio-link-failure detector, the SINR-to-
//! throughput mapping, the handover interruption tracker and a collector
//! façade that drives all three from one SINR stream.

pub mod collector;
pub mod interruption;
pub mod rlf;
pub mod throughput;

pub use collector::{LinkMetrics, MetricsCollector, MetricsConfig, MetricsSummary};
pub use interruption::HandoverInterruptionTracker;
pub use rlf::RlfDetector;
pub use throughput::ThroughputCalculator;
