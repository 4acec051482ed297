//! Simulation time base
//!
//! All stateful components (A3 timer, RLF timer, interruption windows,
//! fading regeneration) take an explicit [`SimTime`] instead of reading the
//! wall clock, so simulation runs are deterministic and tests never sleep.

use serde::{Deserialize, Serialize};

/// A point in simulation time, in seconds since simulation start.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct SimTime(f64);

impl SimTime {
    /// Simulation start (t = 0).
    pub const ZERO: SimTime = SimTime(0.0);

    /// Creates a time from seconds.
    pub fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// Creates a time from milliseconds.
    pub fn from_millis(millis: f64) -> Self {
        Self(millis / 1000.0)
    }

    /// Seconds since simulation start.
    pub fn as_secs(&self) -> f64 {
        self.0
    }

    /// Milliseconds since simulation start.
    pub fn as_millis(&self) -> f64 {
        self.0 * 1000.0
    }

    /// Elapsed seconds since `earlier`. Negative if `earlier` is later.
    pub fn elapsed_since(&self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<f64> for SimTime {
    type Output = SimTime;

    /// Advances the time by `rhs` seconds.
    fn add(self, rhs: f64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f64;

    /// Difference in seconds.
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t={:.3}s", self.0)
    }
}

/// Simulation clock configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimTimeConfig {
    /// Duration of each tick in milliseconds
    #[serde(default = "default_tick_duration_ms")]
    pub tick_duration_ms: f64,
    /// Total simulation duration in ticks
    #[serde(default = "default_total_ticks")]
    pub total_ticks: u64,
}

fn default_tick_duration_ms() -> f64 {
    100.0
}
fn default_total_ticks() -> u64 {
    1000
}

impl Default for SimTimeConfig {
    fn default() -> Self {
        Self {
            tick_duration_ms: default_tick_duration_ms(), // 10 ticks per second
            total_ticks: default_total_ticks(),           // 100 seconds of simulation
        }
    }
}

impl SimTimeConfig {
    /// Creates a new clock configuration.
    pub fn new(tick_duration_ms: f64, total_ticks: u64) -> Self {
        Self {
            tick_duration_ms,
            total_ticks,
        }
    }

    /// Total simulation duration in seconds.
    pub fn total_duration_s(&self) -> f64 {
        self.tick_duration_ms * self.total_ticks as f64 / 1000.0
    }
}

/// Tick-driven simulation clock.
#[derive(Debug, Clone)]
pub struct SimClock {
    config: SimTimeConfig,
    tick: u64,
}

impl SimClock {
    /// Creates a clock at tick 0.
    pub fn new(config: SimTimeConfig) -> Self {
        Self { config, tick: 0 }
    }

    /// Current simulation time.
    pub fn now(&self) -> SimTime {
        SimTime::from_millis(self.tick as f64 * self.config.tick_duration_ms)
    }

    /// Current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advances the clock by one tick and returns the new time.
    pub fn advance(&mut self) -> SimTime {
        self.tick += 1;
        self.now()
    }

    /// True once the configured number of ticks has elapsed.
    pub fn is_complete(&self) -> bool {
        self.tick >= self.config.total_ticks
    }

    /// Resets the clock to tick 0.
    pub fn reset(&mut self) {
        self.tick = 0;
    }

    /// The clock configuration.
    pub fn config(&self) -> &SimTimeConfig {
        &self.config
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(SimTimeConfig::default())
    }
}
