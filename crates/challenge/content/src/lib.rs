//! Reference challenge definitions.
//!
//! Each module implements [`challenge_core::Challenge`] for one challenge:
//! - [`demo`]: three quick form pages under a tight time limit
//! - [`arithmetic`]: a keypad quiz of generated questions
//! - [`sorting`]: drag-sort a shuffled row of numbers
//! - [`hunting`]: find the target numbers hidden in a grid
//! - [`robot`]: steer through a generated maze
//! - [`dates`]: confirm a list of dates on a picker
//!
//! Content is derived from the attempt metadata only, so any attempt can be
//! replayed from its action log.

pub mod arithmetic;
pub mod dates;
pub mod demo;
pub mod hunting;
pub mod robot;
pub mod sorting;

use std::time::Duration;

use challenge_core::Challenge;

pub use arithmetic::{ArithmeticAction, ArithmeticChallenge, ArithmeticState};
pub use dates::{DatesAction, DatesChallenge, DatesState};
pub use demo::{DemoAction, DemoChallenge, DemoState};
pub use hunting::{HuntingAction, HuntingChallenge, HuntingState};
pub use robot::{MazeCache, RobotAction, RobotChallenge, RobotState};
pub use sorting::{SortingAction, SortingChallenge, SortingState};

/// Names of the shipped challenges, as used on the command line.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ChallengeKind {
    Demo,
    Arithmetic,
    Sorting,
    Hunting,
    Robot,
    Dates,
}

impl ChallengeKind {
    pub fn time_limit(self) -> Duration {
        match self {
            ChallengeKind::Demo => DemoChallenge.time_limit(),
            ChallengeKind::Arithmetic => ArithmeticChallenge.time_limit(),
            ChallengeKind::Sorting => SortingChallenge.time_limit(),
            ChallengeKind::Hunting => HuntingChallenge.time_limit(),
            ChallengeKind::Robot => RobotChallenge::default().time_limit(),
            ChallengeKind::Dates => DatesChallenge.time_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_names() {
        assert_eq!("demo".parse::<ChallengeKind>().unwrap(), ChallengeKind::Demo);
        assert_eq!("sorting".parse::<ChallengeKind>().unwrap(), ChallengeKind::Sorting);
        assert_eq!("robot".parse::<ChallengeKind>().unwrap(), ChallengeKind::Robot);
        assert_eq!(ChallengeKind::Dates.to_string(), "dates");
        assert!("towers".parse::<ChallengeKind>().is_err());
    }

    #[test]
    fn every_kind_has_a_time_limit() {
        for kind in ChallengeKind::iter() {
            assert!(kind.time_limit() > Duration::ZERO, "{kind}");
        }
    }
}
