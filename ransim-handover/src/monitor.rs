//! Background retry and supervision for best-effort tasks
//!
//! Periodic re-collection and similar side tasks run through
//! [`retry_with_backoff`], which reports every failed attempt to a
//! supervisor channel. Callers must not hold registry locks across the
//! backoff sleeps; the API takes an owned closure producing a fresh future
//! per attempt.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use ransim_common::error::Result;

/// Bounded exponential backoff schedule.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 2000,
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (0-based), doubling up to the
    /// cap.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ms = self
            .initial_backoff_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(ms.min(self.max_backoff_ms))
    }
}

/// One failed attempt, reported to the supervisor.
#[derive(Debug, Clone)]
pub struct MonitorEvent {
    pub task: String,
    /// 0-based attempt number that failed
    pub attempt: u32,
    pub error: String,
    pub will_retry: bool,
}

/// Runs `op` until it succeeds or the retry budget is spent. Each failure
/// is reported over `events`; reporting is best-effort and never blocks.
pub async fn retry_with_backoff<T, F, Fut>(
    task: &str,
    policy: RetryPolicy,
    events: &mpsc::Sender<MonitorEvent>,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let will_retry = attempt < policy.max_retries;
                let _ = events.try_send(MonitorEvent {
                    task: task.to_string(),
                    attempt,
                    error: err.to_string(),
                    will_retry,
                });
                if !will_retry {
                    return Err(err);
                }
                tokio::time::sleep(policy.backoff(attempt)).await;
                attempt += 1;
            }
        }
    }
}

/// Drains monitor events into the log until every sender is dropped.
pub fn spawn_supervisor(mut events: mpsc::Receiver<MonitorEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if event.will_retry {
                warn!(
                    task = %event.task,
                    attempt = event.attempt,
                    error = %event.error,
                    "task failed; retrying"
                );
            } else {
                error!(
                    task = %event.task,
                    attempt = event.attempt,
                    error = %event.error,
                    "task failed; giving up"
                );
            }
        }
    })
}
