//! Linear backoff for background polls.
//!
//! After `n` consecutive failures the poller pauses for `min(cap, step * n)`, measured
//! from the latest failure. Ticks that land inside the pause are skipped entirely. One
//! success resets the counter and clears the pause.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub step: Duration,
    pub cap: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            step: Duration::from_secs(5),
            cap: Duration::from_secs(60),
        }
    }
}

impl BackoffPolicy {
    /// Pause after `failures` consecutive failures.
    pub fn pause_for(&self, failures: u32) -> Duration {
        self.step.saturating_mul(failures).min(self.cap)
    }
}

/// Failure counter and pause window of one poll loop.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    failures: u32,
    paused_until: Option<Instant>,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            failures: 0,
            paused_until: None,
        }
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Counts a failure observed at `now` and returns the resulting pause.
    pub fn record_failure(&mut self, now: Instant) -> Duration {
        self.failures = self.failures.saturating_add(1);
        let pause = self.policy.pause_for(self.failures);
        self.paused_until = Some(now + pause);
        pause
    }

    pub fn record_success(&mut self) {
        self.failures = 0;
        self.paused_until = None;
    }

    /// False while `now` is inside the pause window.
    pub fn should_poll(&self, now: Instant) -> bool {
        self.paused_until.is_none_or(|until| now >= until)
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.paused_until
            .map(|until| until.saturating_duration_since(now))
            .unwrap_or_default()
    }
}
