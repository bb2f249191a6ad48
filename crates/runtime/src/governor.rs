//! Log-size and time budgets, and how they combine with challenge rules into
//! a single attempt outcome.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::info;

/// Why an attempt ended without completing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum FailureReason {
    /// Reported by the challenge's own rules.
    Challenge(String),
    /// The action log exhausted its size budget.
    TooManyActions,
    /// The time limit elapsed.
    TimeUp,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Challenge(reason) => f.write_str(reason),
            FailureReason::TooManyActions => {
                f.write_str("You performed too many actions. Try again!")
            }
            FailureReason::TimeUp => f.write_str("Time's up! Try again!"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "camelCase")]
pub enum AttemptOutcome {
    InProgress,
    Completed,
    Failed(FailureReason),
}

impl AttemptOutcome {
    pub fn is_finished(&self) -> bool {
        !matches!(self, AttemptOutcome::InProgress)
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            AttemptOutcome::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Remaining log budget as a percentage, rounded up.
pub fn health_percent(size: usize, budget: usize) -> u8 {
    if budget == 0 {
        return 0;
    }
    let remaining = 1.0 - size as f64 / budget as f64;
    (remaining * 100.0).ceil().clamp(0.0, 100.0) as u8
}

/// Remaining time as a percentage, rounded to nearest.
pub fn time_left_percent(elapsed: Duration, limit: Duration) -> u8 {
    if limit.is_zero() {
        return 0;
    }
    let remaining = 1.0 - elapsed.as_secs_f64() / limit.as_secs_f64();
    (remaining * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Result of one time poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimePoll {
    pub time_left: u8,
    /// True only on the poll that first observed the limit.
    pub expired_now: bool,
}

/// Tracks the budgets of a single attempt.
///
/// Expiry is cooperative: nothing here stops further dispatch, it only
/// changes what [`ResourceGovernor::evaluate`] reports.
#[derive(Clone, Debug)]
pub struct ResourceGovernor {
    budget: usize,
    time_limit: Duration,
    started: Instant,
    time_left: u8,
    time_up: bool,
}

impl ResourceGovernor {
    pub fn new(time_limit: Duration, budget: usize, started: Instant) -> Self {
        Self {
            budget,
            time_limit,
            started,
            time_left: 100,
            time_up: false,
        }
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn health(&self, size: usize) -> u8 {
        health_percent(size, self.budget)
    }

    pub fn time_left(&self) -> u8 {
        self.time_left
    }

    pub fn is_time_up(&self) -> bool {
        self.time_up
    }

    /// Recomputes time left against the clock.
    pub fn poll(&mut self) -> TimePoll {
        self.poll_elapsed(self.started.elapsed())
    }

    /// Recomputes time left for a given elapsed duration.
    pub fn poll_elapsed(&mut self, elapsed: Duration) -> TimePoll {
        self.time_left = time_left_percent(elapsed, self.time_limit);

        let expired_now = self.time_left == 0 && !self.time_up;
        if expired_now {
            self.time_up = true;
            info!(
                target: "runtime::governor",
                elapsed_ms = elapsed.as_millis() as u64,
                limit_ms = self.time_limit.as_millis() as u64,
                "time limit reached"
            );
        }

        TimePoll {
            time_left: self.time_left,
            expired_now,
        }
    }

    /// Merges challenge rules with the budgets.
    ///
    /// Completion wins over everything; a challenge-reported failure wins over
    /// the budgets; an exhausted log wins over an elapsed time limit.
    pub fn evaluate(&self, completed: bool, failure: Option<String>, health: u8) -> AttemptOutcome {
        if completed {
            AttemptOutcome::Completed
        } else if let Some(reason) = failure {
            AttemptOutcome::Failed(FailureReason::Challenge(reason))
        } else if health == 0 {
            AttemptOutcome::Failed(FailureReason::TooManyActions)
        } else if self.time_up {
            AttemptOutcome::Failed(FailureReason::TimeUp)
        } else {
            AttemptOutcome::InProgress
        }
    }
}
