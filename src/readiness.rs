//! Bounded wake/poll loop that brings a sleeping TV online.
//!
//! One retry shape drives both "power the device on" and "wait until the
//! control API responds": run the attempt, and on any failure nudge the
//! device with wake-on-LAN and wait a constant interval before the next try.
//! Per-attempt transport and auth failures are expected and swallowed; only
//! exhaustion surfaces, as an explicit [`TvError::Exhausted`].

use std::future::Future;

use crate::config::TvConfig;
use crate::error::{Result, TvError};
use crate::wake::WakeSignal;

/// Drives the bounded retry loop for one device.
pub struct ReadinessController<'a> {
    wake: &'a dyn WakeSignal,
    config: &'a TvConfig,
    mac: Option<&'a str>,
}

impl<'a> ReadinessController<'a> {
    pub fn new(wake: &'a dyn WakeSignal, config: &'a TvConfig, mac: Option<&'a str>) -> Self {
        Self { wake, config, mac }
    }

    /// Run `attempt` up to `max_attempts` times, starting the counter at 0.
    pub async fn run<T, F, Fut>(&self, max_attempts: u32, attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.run_from(0, max_attempts, attempt).await
    }

    /// Run `attempt` with an externally supplied resume point.
    ///
    /// Success on any attempt returns immediately. A failed attempt emits the
    /// configured number of wake packets (a no-op without a hardware address)
    /// and then waits the fixed interval. No jitter, no backoff. Running out
    /// of attempts yields [`TvError::Exhausted`].
    pub async fn run_from<T, F, Fut>(
        &self,
        mut counter: u32,
        max_attempts: u32,
        mut attempt: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        while counter < max_attempts {
            counter += 1;
            if counter % 10 == 0 {
                tracing::info!(attempt = counter, max = max_attempts, "still waking device");
            }

            match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    tracing::trace!(attempt = counter, %err, "attempt failed, nudging device");
                    self.nudge().await;
                }
            }
        }

        Err(TvError::Exhausted {
            attempts: max_attempts,
        })
    }

    /// Emit the configured burst of wake packets, then wait the fixed
    /// interval. Without a hardware address the packet step is skipped and
    /// the loop degrades to plain polling.
    async fn nudge(&self) {
        if let Some(mac) = self.mac {
            for _ in 0..self.config.wake_requests {
                self.wake.wake(mac).await;
            }
        }
        tokio::time::sleep(self.config.wake_timeout()).await;
    }
}
