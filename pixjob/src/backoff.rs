//! Wait schedules between status polls and between transport retries.

use std::time::Duration;

use crate::error::{Error, Result};

/// Ordered waits applied between successive polls of one job.
///
/// The last step repeats once the list is exhausted. The delay depends only
/// on how many polls have happened, never on the clock, so a schedule yields
/// the same sequence on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffSchedule {
    steps: Vec<Duration>,
}

impl Default for BackoffSchedule {
    /// 2s, 4s, 8s, then 15s repeating.
    fn default() -> Self {
        Self {
            steps: [2, 4, 8, 15].map(Duration::from_secs).to_vec(),
        }
    }
}

impl BackoffSchedule {
    /// Create a schedule from its steps; the last step is the repeating tail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `steps` is empty or decreases anywhere.
    pub fn new(steps: impl Into<Vec<Duration>>) -> Result<Self> {
        let steps = steps.into();
        if steps.is_empty() {
            return Err(Error::config("backoff schedule needs at least one step"));
        }
        if steps.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::config(format!(
                "backoff schedule must be non-decreasing, got {steps:?}"
            )));
        }
        Ok(Self { steps })
    }

    /// Create a schedule from whole seconds.
    ///
    /// # Errors
    ///
    /// Same as [`BackoffSchedule::new`].
    pub fn from_secs(steps: &[u64]) -> Result<Self> {
        Self::new(
            steps
                .iter()
                .copied()
                .map(Duration::from_secs)
                .collect::<Vec<_>>(),
        )
    }

    /// A schedule that always waits `interval`.
    #[must_use]
    pub fn fixed(interval: Duration) -> Self {
        Self {
            steps: vec![interval],
        }
    }

    /// The configured steps.
    #[must_use]
    pub fn steps(&self) -> &[Duration] {
        &self.steps
    }

    /// The wait after `polls` non-terminal polls have completed (0-based).
    #[must_use]
    pub fn delay_for_poll(&self, polls: usize) -> Duration {
        self.steps[polls.min(self.steps.len() - 1)]
    }

    /// Infinite iterator over successive waits.
    pub fn iter(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..).map(|n| self.delay_for_poll(n))
    }
}

/// Bounded retry of a single failed transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts for one call, including the first.
    pub max_attempts: u32,
    /// Fixed wait between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Whether another attempt is allowed after `attempts` failures.
    #[must_use]
    pub const fn allows_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }
}
