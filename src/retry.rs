//! Bounded polling.
//!
//! A probe is called at a fixed interval until it reports a value or the
//! attempt budget runs out. Running out is an ordinary outcome, not an
//! error, so the caller decides what a timeout means.

use std::thread;
use std::time::Duration;

/// How often and how long to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between two unsuccessful probes
    pub interval: Duration,

    /// Maximum number of probes (at least one probe is always made)
    pub max_attempts: u32,

    /// Delay after a successful probe before returning
    pub settle: Duration,
}

impl RetryPolicy {
    /// Create a policy with the default timings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that never sleeps.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            interval: Duration::ZERO,
            max_attempts,
            settle: Duration::ZERO,
        }
    }

    /// Set the interval between probes.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the maximum number of probes.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the settle delay.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Worst-case time spent waiting, settle included.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1) + self.settle
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_attempts: 100,
            settle: Duration::from_millis(500),
        }
    }
}

/// Result of [`poll_until`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The probe produced a value
    Ready(T),
    /// The probe never produced a value
    TimedOut {
        /// Number of probes made
        attempts: u32,
    },
}

impl<T> PollOutcome<T> {
    /// Check if the probe succeeded.
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready(_))
    }
}

/// Call `probe` with the 1-based attempt number until it returns `Some`.
pub fn poll_until<T, F>(policy: &RetryPolicy, mut probe: F) -> PollOutcome<T>
where
    F: FnMut(u32) -> Option<T>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        if let Some(value) = probe(attempt) {
            log::debug!("Probe ready after {} attempt(s)", attempt);
            if !policy.settle.is_zero() {
                thread::sleep(policy.settle);
            }
            return PollOutcome::Ready(value);
        }

        if attempt < max_attempts && !policy.interval.is_zero() {
            thread::sleep(policy.interval);
        }
    }

    PollOutcome::TimedOut {
        attempts: max_attempts,
    }
}
