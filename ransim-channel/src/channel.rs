//! Stochastic channel model for a single UE
//!
//! Combines two fading processes on top of a caller-supplied deterministic
//! path loss:
//!
//! - **Shadow fading**: log-normal, spatially correlated. Modeled as an AR(1)
//!   process over the UE's displacement with correlation
//!   `ρ = exp(-d / d_decorr)`, so the marginal distribution stays
//!   `Normal(0, σ_SF)` no matter how the UE moves.
//! - **Fast fading**: Rayleigh-distributed magnitude regenerated once per
//!   Doppler coherence time `T_c = 9 / (16π·f_d)`, held constant in between.
//!
//! All randomness comes from a per-model seeded generator, so a fixed seed
//! reproduces the exact fading trace.

use std::f64::consts::PI;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal, Rayleigh};
use tracing::trace;

use ransim_common::config::ChannelConfig;
use ransim_common::error::{Error, Result};
use ransim_common::sim_time::SimTime;
use ransim_common::types::Vector3;

/// Speed of light in m/s
const SPEED_OF_LIGHT_MPS: f64 = 299_792_458.0;

/// Rayleigh scale parameter giving unit mean power (`E[r²] = 1`)
const RAYLEIGH_UNIT_POWER_SCALE: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Mean of `-20·log10(r)` for a unit-power Rayleigh magnitude, `10·γ / ln 10`
/// with γ the Euler-Mascheroni constant. Subtracted from each draw so the
/// long-run average fading loss is 0 dB.
const RAYLEIGH_MEAN_COMPENSATION_DB: f64 = 2.5066;

/// Floor on the fading magnitude so deep fades stay finite in dB
const MIN_FADING_MAGNITUDE: f64 = 1e-6;

/// Stateful fading process for one UE (or one UE-cell link).
#[derive(Debug, Clone)]
pub struct ChannelModel {
    config: ChannelConfig,
    rng: ChaCha8Rng,
    /// Current shadow-fading value in dB; None until the first update
    shadowing_db: Option<f64>,
    /// Position at which the shadowing value was last updated
    last_position: Option<Vector3>,
    /// Current fast-fading loss in dB (0 until the first regeneration)
    fading_loss_db: f64,
    /// Timestamp of the last fading regeneration
    last_fading_regen: Option<SimTime>,
    /// Coherence time derived from the most recent speed observation
    coherence_time_s: f64,
}

impl ChannelModel {
    /// Creates a channel model with its own deterministic random stream.
    pub fn new(config: &ChannelConfig, seed: u64) -> Self {
        let mut config = *config;
        config.shadowing_sigma_db = config.shadowing_sigma_db.max(0.0);
        Self {
            coherence_time_s: config.stationary_coherence_time_s,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            shadowing_db: None,
            last_position: None,
            fading_loss_db: 0.0,
            last_fading_regen: None,
        }
    }

    /// Advances the shadow-fading process to `position` and returns the new
    /// shadowing value in dB.
    ///
    /// The first call draws from `Normal(0, σ_SF)`. Each later call applies
    /// the AR(1) recurrence over the displacement `d` since the previous
    /// call:
    ///
    /// ```text
    /// ρ   = exp(-d / d_decorr)
    /// new = ρ·prev + sqrt(1 - ρ²)·Normal(0, σ_SF)
    /// ```
    ///
    /// which keeps the marginal standard deviation at σ_SF for any movement
    /// pattern. A zero displacement returns the previous value unchanged.
    pub fn update_shadowing(&mut self, position: Vector3) -> f64 {
        let normal = Normal::new(0.0, self.config.shadowing_sigma_db).expect("invalid normal sigma");
        let updated = match (self.shadowing_db, self.last_position) {
            (Some(prev), Some(last)) => {
                let displacement = last.distance_to(&position);
                let rho = (-displacement / self.config.decorrelation_distance_m).exp();
                let innovation: f64 = normal.sample(&mut self.rng);
                rho * prev + (1.0 - rho * rho).sqrt() * innovation
            }
            _ => normal.sample(&mut self.rng),
        };
        self.shadowing_db = Some(updated);
        self.last_position = Some(position);
        updated
    }

    /// Advances the fast-fading process and returns the fading loss in dB.
    ///
    /// Below `stationary_speed_threshold_mps` the coherence time is pinned
    /// to `stationary_coherence_time_s` so parked devices do not fade at an
    /// unrealistic rate. Otherwise the Doppler shift `f_d = v·f_c / c` gives
    /// `T_c = 9 / (16π·f_d)`. A new Rayleigh magnitude is drawn whenever at
    /// least one coherence time has passed since the last regeneration; the
    /// dB conversion subtracts the distribution's mean so the loss averages
    /// to 0 dB over many draws.
    pub fn update_fast_fading(&mut self, speed_mps: f64, now: SimTime) -> f64 {
        self.coherence_time_s = if speed_mps < self.config.stationary_speed_threshold_mps {
            self.config.stationary_coherence_time_s
        } else {
            let doppler_hz = speed_mps * self.config.carrier_frequency_hz / SPEED_OF_LIGHT_MPS;
            9.0 / (16.0 * PI * doppler_hz)
        };

        let due = match self.last_fading_regen {
            Some(last) => now.elapsed_since(last) >= self.coherence_time_s,
            None => true,
        };
        if due {
            let rayleigh = Rayleigh::new(RAYLEIGH_UNIT_POWER_SCALE).expect("invalid rayleigh scale");
            let magnitude: f64 = rayleigh.sample(&mut self.rng);
            self.fading_loss_db = -20.0 * magnitude.max(MIN_FADING_MAGNITUDE).log10()
                - RAYLEIGH_MEAN_COMPENSATION_DB;
            self.last_fading_regen = Some(now);
            trace!(
                fading_loss_db = self.fading_loss_db,
                coherence_time_s = self.coherence_time_s,
                "fading regenerated"
            );
        }
        self.fading_loss_db
    }

    /// Total channel loss in dB: path loss plus shadowing, plus the fast
    /// fading contribution when `include_fading` is set.
    ///
    /// Fails with an invariant violation if the shadowing process was never
    /// initialized via [`ChannelModel::update_shadowing`].
    pub fn get_total_channel_loss(&self, path_loss_db: f64, include_fading: bool) -> Result<f64> {
        let shadowing = self.shadowing_db.ok_or_else(|| {
            Error::InvariantViolation(
                "channel loss queried before shadowing initialization".to_string(),
            )
        })?;
        let mut total = path_loss_db + shadowing;
        if include_fading {
            total += self.fading_loss_db;
        }
        Ok(total)
    }

    /// Current shadowing value in dB, if initialized.
    pub fn shadowing_db(&self) -> Option<f64> {
        self.shadowing_db
    }

    /// Current fast-fading loss in dB.
    pub fn fading_loss_db(&self) -> f64 {
        self.fading_loss_db
    }

    /// Coherence time derived from the most recent speed observation.
    pub fn coherence_time_s(&self) -> f64 {
        self.coherence_time_s
    }
}
