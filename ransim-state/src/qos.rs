//! Observed QoS measurements and the per-UE sliding window
//!
//! Measurements are validated at ingest and kept in a time-windowed queue
//! with a minimum-retained floor, so sparse reporters keep enough history
//! for a meaningful summary.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use ransim_common::error::{Error, Result};
use ransim_common::sim_time::SimTime;

/// One immutable QoS observation reported for a UE.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QoSMeasurement {
    pub timestamp: SimTime,
    pub latency_ms: f64,
    pub jitter_ms: f64,
    pub throughput_mbps: f64,
    /// Packet loss rate in [0, 1]
    pub packet_loss_rate: f64,
}

impl QoSMeasurement {
    /// Rejects non-finite or out-of-range values.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("latency_ms", self.latency_ms),
            ("jitter_ms", self.jitter_ms),
            ("throughput_mbps", self.throughput_mbps),
            ("packet_loss_rate", self.packet_loss_rate),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Validation(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.packet_loss_rate > 1.0 {
            return Err(Error::Validation(format!(
                "packet_loss_rate must be within [0, 1], got {}",
                self.packet_loss_rate
            )));
        }
        Ok(())
    }
}

/// Min/avg/max over one metric of the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl MetricStats {
    fn over<F: Fn(&QoSMeasurement) -> f64>(samples: &VecDeque<QoSMeasurement>, metric: F) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for sample in samples {
            let value = metric(sample);
            min = min.min(value);
            max = max.max(value);
            sum += value;
        }
        Self {
            min,
            avg: sum / samples.len() as f64,
            max,
        }
    }
}

/// Aggregated view of a UE's QoS window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QosSummary {
    pub count: usize,
    pub latest: QoSMeasurement,
    pub latency_ms: MetricStats,
    pub jitter_ms: MetricStats,
    pub throughput_mbps: MetricStats,
    pub packet_loss_rate: MetricStats,
}

/// Time-windowed measurement queue with a minimum-retained floor.
#[derive(Debug, Clone)]
pub struct QosWindow {
    window_s: f64,
    min_retained: usize,
    samples: VecDeque<QoSMeasurement>,
}

impl QosWindow {
    pub fn new(window_s: f64, min_retained: usize) -> Self {
        Self {
            window_s,
            min_retained,
            samples: VecDeque::new(),
        }
    }

    /// Appends a measurement and prunes samples older than the retention
    /// window, never dropping below the minimum-retained floor.
    pub fn push(&mut self, measurement: QoSMeasurement) {
        self.samples.push_back(measurement);
        let cutoff = measurement.timestamp.as_secs() - self.window_s;
        while self.samples.len() > self.min_retained {
            match self.samples.front() {
                Some(front) if front.timestamp.as_secs() < cutoff => {
                    self.samples.pop_front();
                }
                _ => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = &QoSMeasurement> {
        self.samples.iter()
    }

    /// Aggregated stats over the window; None while empty.
    pub fn summary(&self) -> Option<QosSummary> {
        let latest = *self.samples.back()?;
        Some(QosSummary {
            count: self.samples.len(),
            latest,
            latency_ms: MetricStats::over(&self.samples, |m| m.latency_ms),
            jitter_ms: MetricStats::over(&self.samples, |m| m.jitter_ms),
            throughput_mbps: MetricStats::over(&self.samples, |m| m.throughput_mbps),
            packet_loss_rate: MetricStats::over(&self.samples, |m| m.packet_loss_rate),
        })
    }
}
