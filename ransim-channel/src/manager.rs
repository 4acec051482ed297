//! Registry of per-UE channel models
//!
//! Owns one [`ChannelModel`] per UE behind a single mutex. Models are
//! created on first use with a per-UE seed derived from the manager's base
//! seed, so a whole population replays deterministically.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use ransim_common::config::ChannelConfig;
use ransim_common::error::{Error, Result};
use ransim_common::sim_time::SimTime;
use ransim_common::types::Vector3;

use crate::channel::ChannelModel;

/// Population statistics over the currently initialized shadowing values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowingStats {
    /// Number of UEs with an initialized shadowing process
    pub count: usize,
    /// Mean shadowing value in dB
    pub mean_db: f64,
    /// Standard deviation of shadowing in dB
    pub stddev_db: f64,
}

/// Thread-safe registry mapping UE id to its channel model.
pub struct ChannelModelManager {
    config: ChannelConfig,
    base_seed: u64,
    channels: Mutex<HashMap<i32, ChannelModel>>,
}

impl ChannelModelManager {
    /// Creates an empty registry; per-UE models derive their seeds from
    /// `base_seed`.
    pub fn new(config: ChannelConfig, base_seed: u64) -> Self {
        Self {
            config,
            base_seed,
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i32, ChannelModel>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn seed_for(&self, ue_id: i32) -> u64 {
        // Golden-ratio mix keeps neighboring UE ids on uncorrelated streams
        self.base_seed
            .wrapping_add((ue_id as i64 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Advances both fading processes for a UE, creating its model on first
    /// sight. Returns `(shadowing_db, fading_loss_db)`.
    pub fn update_ue(
        &self,
        ue_id: i32,
        position: Vector3,
        speed_mps: f64,
        now: SimTime,
    ) -> (f64, f64) {
        let mut channels = self.lock();
        let channel = channels.entry(ue_id).or_insert_with(|| {
            debug!(ue_id, "creating channel model");
            ChannelModel::new(&self.config, self.seed_for(ue_id))
        });
        let shadowing = channel.update_shadowing(position);
        let fading = channel.update_fast_fading(speed_mps, now);
        (shadowing, fading)
    }

    /// Total channel loss for a UE given a deterministic path loss.
    ///
    /// Fails with `NotFound` for a UE that was never updated.
    pub fn total_loss(&self, ue_id: i32, path_loss_db: f64, include_fading: bool) -> Result<f64> {
        let channels = self.lock();
        let channel = channels.get(&ue_id).ok_or_else(|| Error::ue_not_found(ue_id))?;
        channel.get_total_channel_loss(path_loss_db, include_fading)
    }

    /// Drops a UE's channel state. Returns whether anything was removed.
    pub fn remove_ue(&self, ue_id: i32) -> bool {
        self.lock().remove(&ue_id).is_some()
    }

    /// Number of tracked UEs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Mean and standard deviation of shadowing across the population.
    /// Diagnostic only; UEs without an initialized process are skipped.
    pub fn shadowing_stats(&self) -> ShadowingStats {
        let channels = self.lock();
        let values: Vec<f64> = channels
            .values()
            .filter_map(|channel| channel.shadowing_db())
            .collect();
        if values.is_empty() {
            return ShadowingStats {
                count: 0,
                mean_db: 0.0,
                stddev_db: 0.0,
            };
        }
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;
        ShadowingStats {
            count,
            mean_db: mean,
            stddev_db: variance.sqrt(),
        }
    }
}
