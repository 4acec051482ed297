//! Handover decision engine
//!
//! One [`HandoverEngine::decide`] call runs a full decision cycle for one
//! UE: coverage-loss override first, then the ML-assisted path when a
//! classifier is wired, then the rule-based best-RSRP candidate, all feeding
//! the A3 machine owned by the state manager. Classifier failures of any
//! kind degrade to the rule-based candidate and are never fatal. No registry
//! lock is held across the classifier await.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use ransim_common::config::{ClassifierConfig, CoverageConfig, SimulationConfig};
use ransim_common::error::Result;
use ransim_common::sim_time::SimTime;
use ransim_state::{DecisionMethod, FeatureVector, HandoverEvent, NetworkStateManager};

use crate::classifier::{ClassifierError, FeatureSchema, HandoverClassifier};
use crate::trace::{CounterSnapshot, DecisionOutcome, DecisionTrace, EngineCounters};

/// Configuration slice consumed by the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    pub coverage: CoverageConfig,
    pub classifier: ClassifierConfig,
}

impl From<&SimulationConfig> for EngineConfig {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            coverage: config.coverage,
            classifier: config.classifier,
        }
    }
}

/// Result of one decision cycle.
#[derive(Debug, Clone)]
pub struct HandoverDecision {
    pub outcome: DecisionOutcome,
    /// The applied handover, when connectivity changed this cycle
    pub event: Option<HandoverEvent>,
    pub trace: DecisionTrace,
}

/// Per-cycle handover decision maker on top of [`NetworkStateManager`].
pub struct HandoverEngine {
    state: Arc<NetworkStateManager>,
    config: EngineConfig,
    classifier: Option<Arc<dyn HandoverClassifier>>,
    schema: FeatureSchema,
    counters: EngineCounters,
}

impl HandoverEngine {
    pub fn new(state: Arc<NetworkStateManager>, config: EngineConfig) -> Self {
        Self {
            state,
            config,
            classifier: None,
            schema: FeatureSchema::default_v1(),
            counters: EngineCounters::default(),
        }
    }

    /// Wires the external classifier used when the ML path is enabled.
    pub fn with_classifier(mut self, classifier: Arc<dyn HandoverClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Runs one decision cycle for one UE.
    ///
    /// Unknown UEs surface as `Err(NotFound)`. Everything else terminates in
    /// a [`DecisionOutcome`], with the coverage-loss override taking
    /// precedence over both decision paths.
    pub async fn decide(&self, ue_id: i32, now: SimTime) -> Result<HandoverDecision> {
        let features = self.state.get_feature_vector(ue_id)?;
        let mut trace = DecisionTrace::new(ue_id, now);
        trace.from_cell = features.serving_cell;

        // Unattached, or the serving cell vanished from the registry:
        // nothing to measure a candidate against.
        let Some(serving_id) = features.serving_cell else {
            debug!(ue_id, "no serving cell; skipping decision");
            return Ok(self.finish(trace, None));
        };
        let Ok(serving) = self.state.get_antenna(serving_id) else {
            warn!(ue_id, serving_id, "serving cell not in registry; skipping decision");
            return Ok(self.finish(trace, None));
        };

        let serving_distance = serving.distance_to(&features.position);
        trace.serving_distance_m = Some(serving_distance);

        // Coverage-loss override: outside the padded radius the UE is
        // forced onto the nearest cell, whatever the decision paths would
        // have picked.
        let coverage_limit = serving.coverage_radius_m * self.config.coverage.radius_multiplier;
        if serving_distance > coverage_limit {
            let nearest = features
                .neighbors
                .iter()
                .min_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
            return match nearest {
                Some(cell) => {
                    let event = self.state.force_handover(ue_id, cell.antenna_id, now)?;
                    trace.outcome = DecisionOutcome::CoverageLoss;
                    trace.coverage_loss = true;
                    trace.candidate = Some(cell.antenna_id);
                    trace.to_cell = Some(event.to_cell);
                    Ok(self.finish(trace, Some(event)))
                }
                None => {
                    warn!(ue_id, "coverage lost with no cells available");
                    Ok(self.finish(trace, None))
                }
            };
        }

        // Candidate selection: a validated ML prediction when the path is
        // enabled, otherwise the best-RSRP non-serving neighbor.
        let mut candidate = features.best_neighbor().map(|n| n.antenna_id);
        let mut method = DecisionMethod::A3;
        let mut confidence = None;
        if self.config.classifier.enabled {
            match self.predict(&features).await {
                Ok((antenna_id, conf)) => {
                    candidate = Some(antenna_id);
                    method = DecisionMethod::Ml;
                    confidence = Some(conf);
                }
                Err(err) => {
                    warn!(ue_id, %err, "classifier path failed; using rule-based candidate");
                    trace.fell_back = true;
                }
            }
        }
        trace.method = method;
        trace.confidence = confidence;

        let Some(target) = candidate else {
            debug!(ue_id, "no candidate cell; skipping decision");
            return Ok(self.finish(trace, None));
        };
        trace.candidate = Some(target);

        let event = self
            .state
            .apply_handover_decision(ue_id, target, method, confidence, now)?;
        if let Some(event) = &event {
            trace.outcome = match method {
                DecisionMethod::Ml => DecisionOutcome::MlAssisted,
                DecisionMethod::A3 => DecisionOutcome::RuleBased,
            };
            trace.to_cell = Some(event.to_cell);
        }
        Ok(self.finish(trace, event))
    }

    /// Calls the classifier under the configured timeout and validates the
    /// response down to a usable target cell.
    async fn predict(&self, features: &FeatureVector) -> Result<(i32, f64)> {
        let classifier = self.classifier.as_ref().ok_or(ClassifierError::Disabled)?;
        let map = self.schema.build(features)?;

        let timeout_ms = self.config.classifier.timeout_ms;
        let prediction = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            classifier.predict(&map),
        )
        .await
        .map_err(|_| ClassifierError::Timeout { timeout_ms })?;
        let response = prediction?;

        let antenna_id: i32 = response.antenna_id.parse().map_err(|_| {
            ClassifierError::Malformed(format!("antenna id {:?}", response.antenna_id))
        })?;
        if self.state.get_antenna(antenna_id).is_err() {
            return Err(ClassifierError::Malformed(format!(
                "predicted antenna {antenna_id} is not registered"
            ))
            .into());
        }
        if response.confidence < self.config.classifier.min_confidence {
            return Err(ClassifierError::NonCompliant(format!(
                "confidence {:.3} below minimum {:.3}",
                response.confidence, self.config.classifier.min_confidence
            ))
            .into());
        }
        if let Some(compliance) = &response.qos_compliance {
            if !compliance.is_compliant() {
                return Err(ClassifierError::NonCompliant(format!(
                    "qos compliance rejected: priority_ok={}, observed {:.3} vs required {:.3}",
                    compliance.service_priority_ok,
                    compliance.observed_confidence,
                    compliance.required_confidence
                ))
                .into());
            }
        }
        Ok((antenna_id, response.confidence))
    }

    fn finish(&self, trace: DecisionTrace, event: Option<HandoverEvent>) -> HandoverDecision {
        self.counters.record(&trace);
        trace.log();
        HandoverDecision {
            outcome: trace.outcome,
            event,
            trace,
        }
    }
}
