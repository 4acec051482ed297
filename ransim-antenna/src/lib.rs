//! Antenna and propagation modeling for ransim
//!
//! This crate provides the per-cell antenna record, the path-loss model
//! variants (macro, micro, pico), radiation patterns and the shared RF
//! link-budget math.

pub mod model;
pub mod pattern;
pub mod propagation;

pub use model::{Antenna, PathLossModel};
pub use pattern::AntennaPattern;
pub use propagation::{
    dbm_to_mw, free_space_path_loss_db, mw_to_dbm, thermal_noise_dbm,
    THERMAL_NOISE_DENSITY_DBM_PER_HZ,
};
