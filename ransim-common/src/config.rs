//! Configuration structures for the ransim simulator
//!
//! One [`SimulationConfig`] covers every subsystem: channel model, A3
//! handover event, coverage-loss override, RLF detection, throughput
//! mapping, interruption tracking, classifier boundary and history bounds.
//! Configurations load from YAML and are range-checked with [`SimulationConfig::validate`]
//! before use.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::sim_time::SimTimeConfig;

/// Channel model parameters (shadowing + fast fading).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Shadow-fading standard deviation σ_SF in dB
    #[serde(default = "default_shadowing_sigma")]
    pub shadowing_sigma_db: f64,
    /// Shadowing decorrelation distance in meters
    #[serde(default = "default_decorrelation_distance")]
    pub decorrelation_distance_m: f64,
    /// Carrier frequency in Hz, used for the Doppler shift
    #[serde(default = "default_carrier_frequency")]
    pub carrier_frequency_hz: f64,
    /// Speed below which a UE is treated as stationary (m/s)
    #[serde(default = "default_stationary_speed")]
    pub stationary_speed_threshold_mps: f64,
    /// Fading coherence time applied in the stationary regime (s)
    #[serde(default = "default_stationary_coherence")]
    pub stationary_coherence_time_s: f64,
}

fn default_shadowing_sigma() -> f64 {
    8.0
}
fn default_decorrelation_distance() -> f64 {
    37.0
}
fn default_carrier_frequency() -> f64 {
    3.5e9
}
fn default_stationary_speed() -> f64 {
    0.1
}
fn default_stationary_coherence() -> f64 {
    10.0
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            shadowing_sigma_db: default_shadowing_sigma(),
            decorrelation_distance_m: default_decorrelation_distance(),
            carrier_frequency_hz: default_carrier_frequency(),
            stationary_speed_threshold_mps: default_stationary_speed(),
            stationary_coherence_time_s: default_stationary_coherence(),
        }
    }
}

/// A3 handover event parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct A3Config {
    /// Hysteresis margin the target must exceed the serving cell by (dB)
    #[serde(default = "default_hysteresis")]
    pub hysteresis_db: f64,
    /// Time the condition must hold before the handover fires (s)
    #[serde(default = "default_time_to_trigger")]
    pub time_to_trigger_s: f64,
}

fn default_hysteresis() -> f64 {
    3.0
}
fn default_time_to_trigger() -> f64 {
    1.0
}

impl Default for A3Config {
    fn default() -> Self {
        Self {
            hysteresis_db: default_hysteresis(),
            time_to_trigger_s: default_time_to_trigger(),
        }
    }
}

/// Coverage-loss override policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageConfig {
    /// A UE farther than `coverage_radius × radius_multiplier` from its
    /// serving cell is force-handed-over to the nearest cell.
    #[serde(default = "default_radius_multiplier")]
    pub radius_multiplier: f64,
}

fn default_radius_multiplier() -> f64 {
    1.2
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            radius_multiplier: default_radius_multiplier(),
        }
    }
}

/// Radio link failure detection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RlfConfig {
    /// SINR below this threshold arms the failure timer (dB)
    #[serde(default = "default_rlf_threshold")]
    pub sinr_threshold_db: f64,
    /// Sustained time below threshold before an RLF is declared (s)
    #[serde(default = "default_rlf_duration")]
    pub failure_duration_s: f64,
}

fn default_rlf_threshold() -> f64 {
    -6.0
}
fn default_rlf_duration() -> f64 {
    1.0
}

impl Default for RlfConfig {
    fn default() -> Self {
        Self {
            sinr_threshold_db: default_rlf_threshold(),
            failure_duration_s: default_rlf_duration(),
        }
    }
}

/// SINR-to-throughput mapping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThroughputConfig {
    /// SINR below which throughput is exactly zero (dB)
    #[serde(default = "default_min_sinr")]
    pub min_sinr_db: f64,
    /// Upper edge of the linearly-degraded RLF zone (dB)
    #[serde(default = "default_rlf_threshold")]
    pub rlf_sinr_threshold_db: f64,
    /// Channel bandwidth in Hz
    #[serde(default = "default_bandwidth")]
    pub bandwidth_hz: f64,
    /// Cap on spectral efficiency in bit/s/Hz
    #[serde(default = "default_max_spectral_efficiency")]
    pub max_spectral_efficiency: f64,
}

fn default_min_sinr() -> f64 {
    -10.0
}
fn default_bandwidth() -> f64 {
    2.0e7
}
fn default_max_spectral_efficiency() -> f64 {
    7.8
}

impl Default for ThroughputConfig {
    fn default() -> Self {
        Self {
            min_sinr_db: default_min_sinr(),
            rlf_sinr_threshold_db: default_rlf_threshold(),
            bandwidth_hz: default_bandwidth(),
            max_spectral_efficiency: default_max_spectral_efficiency(),
        }
    }
}

/// Handover interruption window parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterruptionConfig {
    /// Duration of the service gap opened by each handover (ms)
    #[serde(default = "default_interruption_ms")]
    pub duration_ms: f64,
    /// Cap on remembered interruption windows per UE
    #[serde(default = "default_max_windows")]
    pub max_windows_per_ue: usize,
}

fn default_interruption_ms() -> f64 {
    50.0
}
fn default_max_windows() -> usize {
    1024
}

impl Default for InterruptionConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_interruption_ms(),
            max_windows_per_ue: default_max_windows(),
        }
    }
}

/// Classifier collaborator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Whether the ML-assisted decision path is enabled
    #[serde(default)]
    pub enabled: bool,
    /// Timeout for a single predict call (ms); expiry falls back to rules
    #[serde(default = "default_classifier_timeout")]
    pub timeout_ms: u64,
    /// Minimum confidence a prediction must carry to be used
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

fn default_classifier_timeout() -> u64 {
    200
}
fn default_min_confidence() -> f64 {
    0.8
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: default_classifier_timeout(),
            min_confidence: default_min_confidence(),
        }
    }
}

/// Bounds on per-UE and global history buffers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Ring-buffer capacity for per-UE trajectory samples
    #[serde(default = "default_trajectory_capacity")]
    pub trajectory_capacity: usize,
    /// QoS sliding-window retention in seconds
    #[serde(default = "default_qos_window")]
    pub qos_window_s: f64,
    /// Samples kept even when older than the retention window
    #[serde(default = "default_qos_min_retained")]
    pub qos_min_retained: usize,
    /// Cap on the global handover-event history
    #[serde(default = "default_max_handover_events")]
    pub max_handover_events: usize,
    /// Cap on per-UE handover-event lists
    #[serde(default = "default_max_events_per_ue")]
    pub max_events_per_ue: usize,
}

fn default_trajectory_capacity() -> usize {
    900
}
fn default_qos_window() -> f64 {
    60.0
}
fn default_qos_min_retained() -> usize {
    10
}
fn default_max_handover_events() -> usize {
    1000
}
fn default_max_events_per_ue() -> usize {
    64
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            trajectory_capacity: default_trajectory_capacity(),
            qos_window_s: default_qos_window(),
            qos_min_retained: default_qos_min_retained(),
            max_handover_events: default_max_handover_events(),
            max_events_per_ue: default_max_events_per_ue(),
        }
    }
}

/// Top-level simulator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Channel model parameters
    #[serde(default)]
    pub channel: ChannelConfig,
    /// A3 handover event parameters
    #[serde(default)]
    pub a3: A3Config,
    /// Coverage-loss override policy
    #[serde(default)]
    pub coverage: CoverageConfig,
    /// RLF detection parameters
    #[serde(default)]
    pub rlf: RlfConfig,
    /// SINR-to-throughput mapping
    #[serde(default)]
    pub throughput: ThroughputConfig,
    /// Interruption window parameters
    #[serde(default)]
    pub interruption: InterruptionConfig,
    /// Classifier boundary parameters
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// History buffer bounds
    #[serde(default)]
    pub history: HistoryConfig,
    /// Simulation clock parameters
    #[serde(default)]
    pub time: SimTimeConfig,
}

impl SimulationConfig {
    /// Parses a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Serializes the configuration to a YAML string.
    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Range-checks every field, rejecting configurations that would make
    /// the simulation numerically meaningless.
    pub fn validate(&self) -> Result<(), Error> {
        let c = &self.channel;
        if c.shadowing_sigma_db < 0.0 {
            return Err(Error::Config("shadowing_sigma_db must be >= 0".into()));
        }
        if c.decorrelation_distance_m <= 0.0 {
            return Err(Error::Config("decorrelation_distance_m must be > 0".into()));
        }
        if c.carrier_frequency_hz <= 0.0 {
            return Err(Error::Config("carrier_frequency_hz must be > 0".into()));
        }
        if c.stationary_speed_threshold_mps < 0.0 {
            return Err(Error::Config(
                "stationary_speed_threshold_mps must be >= 0".into(),
            ));
        }
        if c.stationary_coherence_time_s <= 0.0 {
            return Err(Error::Config(
                "stationary_coherence_time_s must be > 0".into(),
            ));
        }
        if self.a3.hysteresis_db < 0.0 {
            return Err(Error::Config("hysteresis_db must be >= 0".into()));
        }
        if self.a3.time_to_trigger_s < 0.0 {
            return Err(Error::Config("time_to_trigger_s must be >= 0".into()));
        }
        if self.coverage.radius_multiplier < 1.0 {
            return Err(Error::Config("radius_multiplier must be >= 1".into()));
        }
        if self.rlf.failure_duration_s <= 0.0 {
            return Err(Error::Config("failure_duration_s must be > 0".into()));
        }
        let t = &self.throughput;
        if t.min_sinr_db >= t.rlf_sinr_threshold_db {
            return Err(Error::Config(
                "min_sinr_db must be below rlf_sinr_threshold_db".into(),
            ));
        }
        if t.bandwidth_hz <= 0.0 {
            return Err(Error::Config("bandwidth_hz must be > 0".into()));
        }
        if t.max_spectral_efficiency <= 0.0 {
            return Err(Error::Config("max_spectral_efficiency must be > 0".into()));
        }
        if self.interruption.duration_ms <= 0.0 {
            return Err(Error::Config("interruption duration_ms must be > 0".into()));
        }
        if self.interruption.max_windows_per_ue == 0 {
            return Err(Error::Config("max_windows_per_ue must be >= 1".into()));
        }
        if self.classifier.timeout_ms == 0 {
            return Err(Error::Config("classifier timeout_ms must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.classifier.min_confidence) {
            return Err(Error::Config("min_confidence must be in [0, 1]".into()));
        }
        let h = &self.history;
        if h.trajectory_capacity == 0 || h.qos_min_retained == 0 {
            return Err(Error::Config("history capacities must be >= 1".into()));
        }
        if h.max_handover_events == 0 || h.max_events_per_ue == 0 {
            return Err(Error::Config("handover history caps must be >= 1".into()));
        }
        if h.qos_window_s <= 0.0 {
            return Err(Error::Config("qos_window_s must be > 0".into()));
        }
        Ok(())
    }
}
