//! Classifier collaborator boundary
//!
//! The engine consults an external model through [`HandoverClassifier`] and
//! never inspects its internals. Features cross the boundary as a
//! schema-validated, order-preserving name/value map; responses come back in
//! the wire shape defined here and are validated before use. Every failure
//! mode maps into [`Error::ClassifierUnavailable`] so callers can treat the
//! whole path as a single recoverable fault.

use async_trait::async_trait;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error as ThisError;

use ransim_common::error::{Error, Result};
use ransim_state::FeatureVector;

/// One feature the schema admits, with the closed range valid values lie in.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
}

/// Versioned list of features sent to the classifier, in wire order.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    pub model_version: &'static str,
    pub features: Vec<FeatureSpec>,
}

impl FeatureSchema {
    /// The v1 feature set. Order is part of the contract.
    pub fn default_v1() -> Self {
        let spec = |name, min, max| FeatureSpec { name, min, max };
        Self {
            model_version: "v1",
            features: vec![
                spec("position_x", -1.0e5, 1.0e5),
                spec("position_y", -1.0e5, 1.0e5),
                spec("speed_mps", 0.0, 150.0),
                spec("serving_rsrp_dbm", -160.0, 0.0),
                spec("serving_sinr_db", -40.0, 50.0),
                spec("best_neighbor_rsrp_dbm", -160.0, 0.0),
                spec("best_neighbor_sinr_db", -40.0, 50.0),
                spec("qos_latency_ms", 0.0, 1.0e4),
                spec("qos_jitter_ms", 0.0, 1.0e3),
                spec("qos_throughput_mbps", 0.0, 1.0e4),
                spec("qos_packet_loss_rate", 0.0, 1.0),
            ],
        }
    }

    /// Builds the wire map from a feature vector, rejecting out-of-range
    /// values at the boundary. Missing QoS history reads as zeros.
    pub fn build(&self, features: &FeatureVector) -> Result<FeatureMap> {
        let serving = features.serving_metrics().ok_or_else(|| {
            Error::Validation("feature vector has no serving-cell metrics".into())
        })?;
        let best = features.best_neighbor().ok_or_else(|| {
            Error::Validation("feature vector has no candidate neighbor".into())
        })?;
        let qos = features.qos;

        let mut map = FeatureMap::with_capacity(self.features.len());
        for spec in &self.features {
            let value = match spec.name {
                "position_x" => features.position.x,
                "position_y" => features.position.y,
                "speed_mps" => features.speed_mps,
                "serving_rsrp_dbm" => serving.rsrp_dbm,
                "serving_sinr_db" => serving.sinr_db,
                "best_neighbor_rsrp_dbm" => best.rsrp_dbm,
                "best_neighbor_sinr_db" => best.sinr_db,
                "qos_latency_ms" => qos.map_or(0.0, |q| q.latency_ms.avg),
                "qos_jitter_ms" => qos.map_or(0.0, |q| q.jitter_ms.avg),
                "qos_throughput_mbps" => qos.map_or(0.0, |q| q.throughput_mbps.avg),
                "qos_packet_loss_rate" => qos.map_or(0.0, |q| q.packet_loss_rate.avg),
                other => {
                    return Err(Error::Validation(format!("unknown feature {other}")));
                }
            };
            if !value.is_finite() || value < spec.min || value > spec.max {
                return Err(Error::Validation(format!(
                    "feature {} = {value} outside [{}, {}]",
                    spec.name, spec.min, spec.max
                )));
            }
            map.push(spec.name, value);
        }
        Ok(map)
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::default_v1()
    }
}

/// Ordered name/value pairs serialized as a JSON object in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMap {
    values: Vec<(String, f64)>,
}

impl FeatureMap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: &str, value: f64) {
        self.values.push((name.to_string(), value));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

impl Serialize for FeatureMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// QoS-compliance block an ML response may carry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QosCompliance {
    pub service_priority_ok: bool,
    pub required_confidence: f64,
    pub observed_confidence: f64,
}

impl QosCompliance {
    pub fn is_compliant(&self) -> bool {
        self.service_priority_ok && self.observed_confidence >= self.required_confidence
    }
}

/// Wire shape of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierResponse {
    /// Target cell as the model names it; parsed and checked by the engine
    pub antenna_id: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qos_compliance: Option<QosCompliance>,
}

/// Failure modes of the classifier path. All of them degrade to the
/// rule-based candidate.
#[derive(Debug, ThisError)]
pub enum ClassifierError {
    #[error("prediction timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("prediction rejected: {0}")]
    NonCompliant(String),

    #[error("classifier not configured")]
    Disabled,
}

impl From<ClassifierError> for Error {
    fn from(err: ClassifierError) -> Self {
        Error::ClassifierUnavailable(err.to_string())
    }
}

/// External model collaborator. Implementations own their transport; the
/// engine wraps every call in its own timeout.
#[async_trait]
pub trait HandoverClassifier: Send + Sync {
    async fn predict(
        &self,
        features: &FeatureMap,
    ) -> std::result::Result<ClassifierResponse, ClassifierError>;
}
