//! Antenna radiation patterns
//!
//! Optional directional gain applied on top of a cell's transmit power.
//! Three variants: isotropic (no directivity), a 3GPP-style sector pattern
//! with horizontal and vertical beamwidth cuts, and a massive-MIMO uniform
//! linear array steered toward a configured direction.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

fn default_beamwidth() -> f64 {
    65.0
}
fn default_vertical_beamwidth() -> f64 {
    10.0
}
fn default_downtilt() -> f64 {
    6.0
}
fn default_front_to_back() -> f64 {
    30.0
}
fn default_sla() -> f64 {
    30.0
}
fn default_elements() -> usize {
    64
}
fn default_element_spacing() -> f64 {
    0.5
}
fn default_min_gain() -> f64 {
    -30.0
}

/// Directional gain model for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AntennaPattern {
    /// Constant 0 dB gain in every direction.
    Isotropic,
    /// 3GPP-style sector antenna: parabolic attenuation in both cuts,
    /// clamped to a front-to-back ratio.
    Sector3gpp {
        /// Boresight azimuth (degrees)
        azimuth_deg: f64,
        /// Horizontal 3 dB beamwidth (degrees)
        #[serde(default = "default_beamwidth")]
        beamwidth_deg: f64,
        /// Vertical 3 dB beamwidth (degrees)
        #[serde(default = "default_vertical_beamwidth")]
        vertical_beamwidth_deg: f64,
        /// Mechanical downtilt below the horizon (degrees)
        #[serde(default = "default_downtilt")]
        downtilt_deg: f64,
        /// Maximum horizontal attenuation (dB)
        #[serde(default = "default_front_to_back")]
        front_to_back_db: f64,
        /// Side-lobe attenuation limit for the vertical cut (dB)
        #[serde(default = "default_sla")]
        sla_db: f64,
    },
    /// Uniform linear array beamformed toward a steering direction.
    MassiveMimo {
        /// Number of array elements
        #[serde(default = "default_elements")]
        elements: usize,
        /// Element spacing in wavelengths
        #[serde(default = "default_element_spacing")]
        element_spacing_wavelengths: f64,
        /// Steering azimuth (degrees)
        steer_azimuth_deg: f64,
        /// Steering elevation (degrees)
        steer_elevation_deg: f64,
        /// Gain floor outside the main lobe (dB)
        #[serde(default = "default_min_gain")]
        min_gain_db: f64,
    },
}

/// Wraps an angle difference into [-180, 180) degrees.
fn wrap_deg(angle_deg: f64) -> f64 {
    (angle_deg + 180.0).rem_euclid(360.0) - 180.0
}

impl AntennaPattern {
    /// Sector pattern at the given boresight azimuth with 3GPP default
    /// beamwidths (65°/10°, 6° downtilt, 30 dB limits).
    pub fn sector(azimuth_deg: f64) -> Self {
        Self::Sector3gpp {
            azimuth_deg,
            beamwidth_deg: default_beamwidth(),
            vertical_beamwidth_deg: default_vertical_beamwidth(),
            downtilt_deg: default_downtilt(),
            front_to_back_db: default_front_to_back(),
            sla_db: default_sla(),
        }
    }

    /// 64-element half-wavelength array steered toward the given direction.
    pub fn massive_mimo(steer_azimuth_deg: f64, steer_elevation_deg: f64) -> Self {
        Self::MassiveMimo {
            elements: default_elements(),
            element_spacing_wavelengths: default_element_spacing(),
            steer_azimuth_deg,
            steer_elevation_deg,
            min_gain_db: default_min_gain(),
        }
    }

    /// Gain in dB toward the given direction (degrees, elevation positive
    /// above the horizon).
    pub fn gain_db(&self, azimuth_deg: f64, elevation_deg: f64) -> f64 {
        match *self {
            AntennaPattern::Isotropic => 0.0,
            AntennaPattern::Sector3gpp {
                azimuth_deg: boresight_deg,
                beamwidth_deg,
                vertical_beamwidth_deg,
                downtilt_deg,
                front_to_back_db,
                sla_db,
            } => {
                // Horizontal cut: A_h = min(12·(Δφ/φ_3dB)², FTB)
                let delta_az = wrap_deg(azimuth_deg - boresight_deg);
                let ratio_h = delta_az / beamwidth_deg;
                let att_h = (12.0 * ratio_h * ratio_h).min(front_to_back_db);
                // Vertical cut against the downtilted boresight:
                // A_v = min(12·(Δθ/θ_3dB)², SLA)
                let delta_el = elevation_deg + downtilt_deg;
                let ratio_v = delta_el / vertical_beamwidth_deg;
                let att_v = (12.0 * ratio_v * ratio_v).min(sla_db);
                -(att_h + att_v).min(front_to_back_db)
            }
            AntennaPattern::MassiveMimo {
                elements,
                element_spacing_wavelengths,
                steer_azimuth_deg,
                steer_elevation_deg,
                min_gain_db,
            } => {
                let n = elements.max(1) as f64;
                // Direction cosine along the array axis for query and
                // steering directions
                let u = azimuth_deg.to_radians().sin() * elevation_deg.to_radians().cos();
                let u0 =
                    steer_azimuth_deg.to_radians().sin() * steer_elevation_deg.to_radians().cos();
                let psi = 2.0 * PI * element_spacing_wavelengths * (u - u0);
                // Normalized array factor |sin(Nψ/2) / (N·sin(ψ/2))|, 1 at ψ=0
                let half = psi / 2.0;
                let af = if half.sin().abs() < 1e-9 {
                    1.0
                } else {
                    ((n * half).sin() / (n * half.sin())).abs()
                };
                let gain = 10.0 * n.log10() + 20.0 * af.max(1e-12).log10();
                gain.max(min_gain_db)
            }
        }
    }
}
