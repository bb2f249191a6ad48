//! Partial-credit accounting.

/// Raised when a challenge's score weights do not add up to exactly 100.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("score weights must total 100, got {total}")]
pub struct ScoreConfigurationError {
    pub total: u32,
}

/// Accumulates weighted partial credit for a single score computation.
///
/// Every contribution declares its weight up front, and the final score can
/// only be read once the declared weights total exactly 100. A challenge that
/// forgets a term (or counts one twice) fails at run time instead of quietly
/// reporting a skewed score.
///
/// ```
/// use challenge_core::ScoreKeeper;
///
/// let mut score = ScoreKeeper::new();
/// score.add(60, 0.5);
/// score.add_full(40);
/// assert_eq!(score.final_score(), Ok(70));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreKeeper {
    score: u32,
    total: u32,
}

impl ScoreKeeper {
    pub const FULL_WEIGHT: u32 = 100;

    pub const fn new() -> Self {
        Self { score: 0, total: 0 }
    }

    /// Adds `floor(weight * fraction)` to the score and `weight` to the total.
    ///
    /// `fraction` is clamped into `[0, 1]`; NaN counts as zero. Sums saturate,
    /// so an overflowing total stays above 100 and is rejected.
    pub fn add(&mut self, weight: u32, fraction: f64) -> &mut Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.score = self.score.saturating_add((f64::from(weight) * fraction).floor() as u32);
        self.total = self.total.saturating_add(weight);
        self
    }

    /// Adds a contribution that was fully earned.
    pub fn add_full(&mut self, weight: u32) -> &mut Self {
        self.add(weight, 1.0)
    }

    /// Sum of the weights declared so far.
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Returns the accumulated score once the weights total exactly 100.
    pub fn final_score(&self) -> Result<u32, ScoreConfigurationError> {
        if self.total != Self::FULL_WEIGHT {
            return Err(ScoreConfigurationError { total: self.total });
        }
        Ok(self.score)
    }
}
