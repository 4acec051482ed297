//! Antenna records and path-loss model variants
//!
//! An [`Antenna`] is the immutable per-cell record (only its load changes
//! after construction). Its [`PathLossModel`] variant selects the
//! deterministic propagation formula; an optional [`AntennaPattern`] adds
//! directional gain.

use serde::{Deserialize, Serialize};

use ransim_common::types::Vector3;

use crate::pattern::AntennaPattern;
use crate::propagation::{dbm_to_mw, free_space_path_loss_db, thermal_noise_dbm};

// ============================================================================
// Path-loss models
// ============================================================================

fn default_path_loss_exponent() -> f64 {
    3.5
}
fn default_reference_distance() -> f64 {
    1.0
}

/// Deterministic path-loss formula, selected per cell at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathLossModel {
    /// Log-distance model anchored at a reference distance:
    /// `PL = FSPL(d0, f) + 10·n·log10(max(d, d0)/d0)`.
    Macro {
        /// Path-loss exponent n
        #[serde(default = "default_path_loss_exponent")]
        path_loss_exponent: f64,
        /// Reference distance d0 (meters)
        #[serde(default = "default_reference_distance")]
        reference_distance_m: f64,
    },
    /// NLOS street-canyon formula:
    /// `PL = 36.7·log10(d_m) + 22.7 + 26·log10(f_MHz)`.
    Micro,
    /// Free-space path loss.
    Pico,
}

impl PathLossModel {
    /// Macro model with the default exponent (3.5) and 1 m reference.
    pub fn macro_cell() -> Self {
        Self::Macro {
            path_loss_exponent: default_path_loss_exponent(),
            reference_distance_m: default_reference_distance(),
        }
    }

    /// Path loss in dB at the given link distance and carrier frequency.
    pub fn path_loss_db(&self, distance_m: f64, carrier_frequency_hz: f64) -> f64 {
        let freq_mhz = carrier_frequency_hz / 1.0e6;
        match *self {
            PathLossModel::Macro {
                path_loss_exponent,
                reference_distance_m,
            } => {
                let d0 = reference_distance_m.max(1e-3);
                let reference_loss = free_space_path_loss_db(d0 / 1000.0, freq_mhz);
                let d = distance_m.max(d0);
                reference_loss + 10.0 * path_loss_exponent * (d / d0).log10()
            }
            PathLossModel::Micro => {
                let d = distance_m.max(1.0);
                36.7 * d.log10() + 22.7 + 26.0 * freq_mhz.log10()
            }
            PathLossModel::Pico => free_space_path_loss_db(distance_m / 1000.0, freq_mhz),
        }
    }
}

// ============================================================================
// Antenna record
// ============================================================================

fn default_load() -> f64 {
    0.0
}

/// One cell of the simulated network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Antenna {
    /// Cell identifier
    pub id: i32,
    /// Antenna position (meters, local tangent plane)
    pub position: Vector3,
    /// Carrier frequency (Hz)
    pub carrier_frequency_hz: f64,
    /// Transmit power (dBm)
    pub tx_power_dbm: f64,
    /// Path-loss model variant
    pub model: PathLossModel,
    /// Optional radiation pattern
    #[serde(default)]
    pub pattern: Option<AntennaPattern>,
    /// Nominal coverage radius (meters), used by the coverage-loss override
    pub coverage_radius_m: f64,
    /// Current cell load in [0, 1]
    #[serde(default = "default_load")]
    pub current_load: f64,
}

impl Antenna {
    /// Creates an antenna without a radiation pattern and zero load.
    pub fn new(
        id: i32,
        position: Vector3,
        carrier_frequency_hz: f64,
        tx_power_dbm: f64,
        model: PathLossModel,
        coverage_radius_m: f64,
    ) -> Self {
        Self {
            id,
            position,
            carrier_frequency_hz,
            tx_power_dbm,
            model,
            pattern: None,
            coverage_radius_m,
            current_load: 0.0,
        }
    }

    /// Attaches a radiation pattern.
    pub fn with_pattern(mut self, pattern: AntennaPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// 3D distance from the antenna to a position (meters).
    pub fn distance_to(&self, position: &Vector3) -> f64 {
        self.position.distance_to(position)
    }

    /// Deterministic path loss toward a UE position (dB), excluding pattern
    /// gain and stochastic fading.
    pub fn path_loss_db(&self, ue_position: &Vector3) -> f64 {
        let distance = self.distance_to(ue_position);
        self.model.path_loss_db(distance, self.carrier_frequency_hz)
    }

    /// Directional gain toward a UE position (dB); 0 without a pattern.
    pub fn pattern_gain_db(&self, ue_position: &Vector3) -> f64 {
        match &self.pattern {
            Some(pattern) => {
                let azimuth = self.position.azimuth_deg_to(ue_position);
                let elevation = self.position.elevation_deg_to(ue_position);
                pattern.gain_db(azimuth, elevation)
            }
            None => 0.0,
        }
    }

    /// Reference signal received power at a UE position (dBm):
    /// `tx_power - path_loss + pattern_gain`.
    pub fn rsrp_dbm(&self, ue_position: &Vector3) -> f64 {
        self.tx_power_dbm - self.path_loss_db(ue_position) + self.pattern_gain_db(ue_position)
    }

    /// SINR at a UE position (dB) against thermal noise plus the received
    /// power of the given interfering cells. Callers pass every cell except
    /// this one as interferers.
    pub fn sinr_db(&self, ue_position: &Vector3, interferers: &[&Antenna], bandwidth_hz: f64) -> f64 {
        let signal_mw = dbm_to_mw(self.rsrp_dbm(ue_position));
        let noise_mw = dbm_to_mw(thermal_noise_dbm(bandwidth_hz));
        let interference_mw: f64 = interferers
            .iter()
            .map(|cell| dbm_to_mw(cell.rsrp_dbm(ue_position)))
            .sum();
        10.0 * (signal_mw / (noise_mw + interference_mw)).log10()
    }

    /// Updates the cell load, clamped into [0, 1].
    pub fn set_load(&mut self, load: f64) {
        self.current_load = load.clamp(0.0, 1.0);
    }
}
