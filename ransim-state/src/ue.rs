//! Per-UE connectivity state

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use ransim_common::config::HistoryConfig;
use ransim_common::sim_time::SimTime;
use ransim_common::types::Vector3;

use crate::a3::A3Timer;
use crate::event::HandoverEvent;
use crate::qos::QosWindow;

/// One point of a UE's movement history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub position: Vector3,
    pub speed_mps: f64,
    pub timestamp: SimTime,
}

/// State of one connected device. Owned exclusively by the network state
/// manager; mutated only through manager methods.
#[derive(Debug, Clone)]
pub struct UeState {
    pub id: i32,
    pub position: Vector3,
    pub speed_mps: f64,
    /// Currently serving cell, if attached
    pub connected_antenna: Option<i32>,
    /// A3 timer episode in progress, if any
    pub a3: A3Timer,
    trajectory: VecDeque<TrajectorySample>,
    trajectory_capacity: usize,
    qos: QosWindow,
    events: VecDeque<HandoverEvent>,
    max_events: usize,
}

impl UeState {
    pub fn new(id: i32, position: Vector3, speed_mps: f64, history: &HistoryConfig) -> Self {
        Self {
            id,
            position,
            speed_mps,
            connected_antenna: None,
            a3: A3Timer::default(),
            trajectory: VecDeque::new(),
            trajectory_capacity: history.trajectory_capacity,
            qos: QosWindow::new(history.qos_window_s, history.qos_min_retained),
            events: VecDeque::new(),
            max_events: history.max_events_per_ue,
        }
    }

    /// Moves the UE and appends a trajectory sample, dropping the oldest
    /// sample once the ring is full.
    pub fn update_position(&mut self, position: Vector3, speed_mps: f64, now: SimTime) {
        self.position = position;
        self.speed_mps = speed_mps;
        if self.trajectory.len() >= self.trajectory_capacity {
            self.trajectory.pop_front();
        }
        self.trajectory.push_back(TrajectorySample {
            position,
            speed_mps,
            timestamp: now,
        });
    }

    /// Appends a handover event to the bounded per-UE list.
    pub fn push_event(&mut self, event: HandoverEvent) {
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn trajectory(&self) -> impl Iterator<Item = &TrajectorySample> {
        self.trajectory.iter()
    }

    pub fn trajectory_len(&self) -> usize {
        self.trajectory.len()
    }

    pub fn qos(&self) -> &QosWindow {
        &self.qos
    }

    pub fn qos_mut(&mut self) -> &mut QosWindow {
        &mut self.qos
    }

    pub fn events(&self) -> impl Iterator<Item = &HandoverEvent> {
        self.events.iter()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}
