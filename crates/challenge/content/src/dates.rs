//! Pick twenty given dates and times, one after another, within a minute.

use std::time::Duration;

use challenge_core::{
    ActionMetadata, Challenge, ChallengeMetadata, ScoreConfigurationError, ScoreKeeper,
};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Format of the picker's value.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

pub const EXPECTED_DATES: [&str; 20] = [
    "2010-03-25 01:25",
    "2010-09-25 01:50",
    "2019-06-08 18:45",
    "1986-10-17 03:15",
    "1983-09-17 22:20",
    "2006-08-23 18:30",
    "2008-05-16 04:05",
    "1980-01-18 04:25",
    "1992-07-02 01:40",
    "2000-09-22 01:00",
    "1986-01-04 20:20",
    "1993-07-18 06:10",
    "1985-09-01 11:05",
    "1980-12-29 07:15",
    "1993-07-24 02:35",
    "2029-09-18 21:58",
    "2028-01-20 14:50",
    "1995-07-09 10:33",
    "2013-06-01 16:15",
    "2009-02-25 05:37",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatesState {
    pub completed: Vec<String>,
    pub value: String,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, strum::VariantNames, strum::IntoStaticStr)]
#[serde(tag = "type", content = "payload")]
pub enum DatesAction {
    /// Moves the picker to a value in [`DATE_FORMAT`].
    #[serde(rename = "s")]
    #[strum(serialize = "s")]
    Select(String),

    /// Confirms the current value.
    #[serde(rename = "a")]
    #[strum(serialize = "a")]
    Accept(Number),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DatesChallenge;

impl Challenge for DatesChallenge {
    type State = DatesState;
    type Action = DatesAction;

    fn time_limit(&self) -> Duration {
        Duration::from_secs(60)
    }

    /// The picker opens on the attempt's start time, in UTC.
    fn initialize(&self, metadata: &ChallengeMetadata) -> DatesState {
        let value = DateTime::from_timestamp_millis(metadata.start_time)
            .map(|start| start.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        DatesState {
            completed: Vec::new(),
            value,
            error: None,
        }
    }

    fn apply(&self, draft: &mut DatesState, action: DatesAction, _metadata: ActionMetadata) {
        match action {
            DatesAction::Select(value) => draft.value = value,
            DatesAction::Accept(_) if draft.completed.contains(&draft.value) => {
                draft.error = Some("You already completed this date.".to_owned());
            }
            DatesAction::Accept(_) if !EXPECTED_DATES.contains(&draft.value.as_str()) => {
                draft.error = Some("This date is not part of the challenge.".to_owned());
            }
            DatesAction::Accept(_) => draft.completed.push(draft.value.clone()),
        }
    }

    fn is_completed(&self, state: &DatesState) -> bool {
        state.completed.len() >= EXPECTED_DATES.len()
    }

    fn failure_reason(&self, state: &DatesState) -> Option<String> {
        state.error.clone()
    }

    fn score(&self, state: &DatesState) -> Result<Option<u32>, ScoreConfigurationError> {
        let mut score = ScoreKeeper::new();
        score.add(100, state.completed.len() as f64 / EXPECTED_DATES.len() as f64);
        score.final_score().map(Some)
    }
}
