//! Stochastic channel modeling for ransim
//!
//! This crate provides the per-UE fading processes: spatially-correlated
//! log-normal shadowing and Doppler-driven Rayleigh fast fading, plus a
//! thread-safe registry managing one model per UE.

pub mod channel;
pub mod manager;

pub use channel::ChannelModel;
pub use manager::{ChannelModelManager, ShadowingStats};
