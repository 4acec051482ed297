//! Common types and utilities for ransim
//!
//! This crate provides shared types, configuration structures, and utilities
//! used across all ransim crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod sim_time;
pub mod types;

pub use config::{
    A3Config, ChannelConfig, ClassifierConfig, CoverageConfig, HistoryConfig, InterruptionConfig,
    RlfConfig, SimulationConfig, ThroughputConfig,
};
pub use error::{Error, ResourceKind, Result};
pub use logging::{init_logging, init_logging_with_filter, LogLevel};
pub use sim_time::{SimClock, SimTime, SimTimeConfig};
pub use types::Vector3;
