//! A3 hysteresis / time-to-trigger state machine
//!
//! Debounces handover triggers: a neighbor must exceed the serving cell by
//! the hysteresis margin for a sustained time-to-trigger before a handover
//! fires. Transient crossings cancel the timer, which prevents ping-pong
//! between cells with similar signal strength.

use serde::{Deserialize, Serialize};

use ransim_common::config::A3Config;
use ransim_common::sim_time::SimTime;

/// Result of one timer evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum A3Outcome {
    /// Condition not met, no timer running
    Idle,
    /// Condition met, timer started for this target
    Started,
    /// Timer running, time-to-trigger not yet reached
    Timing,
    /// Condition dropped back within hysteresis, timer canceled
    Canceled,
    /// Candidate target changed mid-timer, timer restarted
    Restarted,
    /// Time-to-trigger reached, handover fires now
    Fired,
}

/// Per-UE A3 timer state (`idle → timing → fired`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct A3Timer {
    /// When the current timing episode started
    pub started_at: Option<SimTime>,
    /// Candidate target cell of the current episode
    pub target: Option<i32>,
}

impl A3Timer {
    /// Whether a timing episode is in progress.
    pub fn is_timing(&self) -> bool {
        self.started_at.is_some()
    }

    /// Clears any episode in progress.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.target = None;
    }

    /// Advances the machine with the current RSRP difference
    /// (`target - serving`, dB) toward `target`. Returns what happened;
    /// on [`A3Outcome::Fired`] the caller performs the handover.
    pub fn evaluate(
        &mut self,
        diff_db: f64,
        target: i32,
        config: &A3Config,
        now: SimTime,
    ) -> A3Outcome {
        if diff_db <= config.hysteresis_db {
            if self.is_timing() {
                self.reset();
                return A3Outcome::Canceled;
            }
            return A3Outcome::Idle;
        }

        match self.started_at {
            None => {
                if config.time_to_trigger_s <= 0.0 {
                    return A3Outcome::Fired;
                }
                self.started_at = Some(now);
                self.target = Some(target);
                A3Outcome::Started
            }
            Some(started) => {
                if self.target != Some(target) {
                    // A new best candidate earns a fresh time-to-trigger
                    self.started_at = Some(now);
                    self.target = Some(target);
                    return A3Outcome::Restarted;
                }
                if now.elapsed_since(started) >= config.time_to_trigger_s {
                    self.reset();
                    A3Outcome::Fired
                } else {
                    A3Outcome::Timing
                }
            }
        }
    }
}
