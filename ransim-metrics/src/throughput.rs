//! SINR-to-throughput mapping
//!
//! Piecewise curve: zero below the minimum usable SINR, a linear ramp
//! through the RLF zone, and a capped Shannon capacity above it. Throughput
//! is always zero while a handover interruption is active.

use ransim_common::config::ThroughputConfig;

/// Stateless SINR-to-throughput map.
#[derive(Debug, Clone)]
pub struct ThroughputCalculator {
    config: ThroughputConfig,
}

impl ThroughputCalculator {
    pub fn new(config: ThroughputConfig) -> Self {
        Self { config }
    }

    /// Shannon capacity in bit/s at the given SINR, capped at
    /// `max_spectral_efficiency × bandwidth`.
    fn shannon_bps(&self, sinr_db: f64) -> f64 {
        let snr_linear = 10f64.powf(sinr_db / 10.0);
        let capacity = self.config.bandwidth_hz * (1.0 + snr_linear).log2();
        capacity.min(self.config.max_spectral_efficiency * self.config.bandwidth_hz)
    }

    /// Throughput in Mbps for one SINR observation.
    ///
    /// ```text
    /// sinr < min_sinr              -> 0
    /// min_sinr <= sinr < rlf_thr   -> linear ramp up to Shannon(rlf_thr)
    /// sinr >= rlf_thr              -> capped Shannon capacity
    /// ```
    ///
    /// An active interruption forces 0 regardless of SINR.
    pub fn throughput_mbps(&self, sinr_db: f64, in_interruption: bool) -> f64 {
        if in_interruption {
            return 0.0;
        }
        let c = &self.config;
        if sinr_db < c.min_sinr_db {
            return 0.0;
        }
        let bps = if sinr_db < c.rlf_sinr_threshold_db {
            let fraction =
                (sinr_db - c.min_sinr_db) / (c.rlf_sinr_threshold_db - c.min_sinr_db);
            fraction * self.shannon_bps(c.rlf_sinr_threshold_db)
        } else {
            self.shannon_bps(sinr_db)
        };
        bps / 1.0e6
    }
}
