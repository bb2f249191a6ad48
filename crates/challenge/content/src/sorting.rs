//! Drag-and-drop sorting of a shuffled row of numbers.
//!
//! Partial credit is awarded relative to how sorted the row was at the start,
//! so an untouched row scores zero.

use std::time::Duration;

use challenge_core::{
    ActionMetadata, Challenge, ChallengeMetadata, DigestStream, ScoreConfigurationError,
    ScoreKeeper, digest_hex,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ROW_SIZE: usize = 24;
const MAX_SHUFFLE_ROUNDS: usize = 1000;
const TARGET_SORTEDNESS: f64 = 0.25;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SortingState {
    pub values: Vec<u32>,
    pub source_index: Option<usize>,
    pub target_index: Option<usize>,
    pub baseline: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, strum::VariantNames, strum::IntoStaticStr)]
#[serde(tag = "type", content = "payload")]
pub enum SortingAction {
    /// Picks up the item at an index.
    #[serde(rename = "s")]
    #[strum(serialize = "s")]
    Select(usize),

    #[serde(rename = "o")]
    #[strum(serialize = "o")]
    Over(usize),

    /// Drops the picked item at an index.
    #[serde(rename = "d")]
    #[strum(serialize = "d")]
    Drop(usize),

    /// Cancels the drag.
    #[serde(rename = "e")]
    #[strum(serialize = "e")]
    End(Value),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SortingChallenge;

impl Challenge for SortingChallenge {
    type State = SortingState;
    type Action = SortingAction;

    fn time_limit(&self) -> Duration {
        Duration::from_secs(10)
    }

    fn initialize(&self, metadata: &ChallengeMetadata) -> SortingState {
        let random_seed = digest_hex(format!(
            "{}-{}-{}",
            metadata.seed, metadata.attempt_id, metadata.start_time
        ));
        let values = shuffle(&random_seed);

        SortingState {
            baseline: sortedness(&values),
            values,
            source_index: None,
            target_index: None,
        }
    }

    fn apply(&self, draft: &mut SortingState, action: SortingAction, _metadata: ActionMetadata) {
        match action {
            SortingAction::Select(index) => draft.source_index = Some(index),
            SortingAction::Over(index) => draft.target_index = Some(index),
            SortingAction::Drop(target) => {
                match draft.source_index {
                    Some(source) if source != target && source < draft.values.len() => {
                        let value = draft.values.remove(source);
                        let target = target.min(draft.values.len());
                        draft.values.insert(target, value);
                    }
                    _ => {}
                }
                draft.source_index = None;
                draft.target_index = None;
            }
            SortingAction::End(_) => {
                draft.source_index = None;
                draft.target_index = None;
            }
        }
    }

    fn is_completed(&self, state: &SortingState) -> bool {
        state
            .values
            .iter()
            .enumerate()
            .all(|(index, &value)| value as usize == index + 1)
    }

    fn score(&self, state: &SortingState) -> Result<Option<u32>, ScoreConfigurationError> {
        let fraction = if state.baseline >= 1.0 {
            1.0
        } else {
            (sortedness(&state.values) - state.baseline) / (1.0 - state.baseline)
        };
        let mut score = ScoreKeeper::new();
        score.add(100, fraction);
        score.final_score().map(Some)
    }
}

/// Share of adjacent pairs that are in ascending order.
pub fn sortedness(values: &[u32]) -> f64 {
    if values.len() < 2 {
        return 1.0;
    }
    let ascending = values.windows(2).filter(|pair| pair[1] > pair[0]).count();
    ascending as f64 / (values.len() - 1) as f64
}

/// Orders `1..=ROW_SIZE` by per-item digests, then swaps pairs until the row
/// is mostly unsorted. A swap that would increase sortedness is undone.
fn shuffle(random_seed: &str) -> Vec<u32> {
    let mut keyed: Vec<(String, u32)> = (1..=ROW_SIZE as u32)
        .map(|value| (digest_hex(format!("{random_seed}{}", value - 1)), value))
        .collect();
    keyed.sort();
    let mut values: Vec<u32> = keyed.into_iter().map(|(_, value)| value).collect();

    let mut rng = DigestStream::new(random_seed);
    for _ in 0..MAX_SHUFFLE_ROUNDS {
        let score = sortedness(&values);
        if score < TARGET_SORTEDNESS {
            break;
        }
        let a = rng.next_below(ROW_SIZE as u32) as usize;
        let b = rng.next_below(ROW_SIZE as u32) as usize;
        values.swap(a, b);
        if sortedness(&values) > score {
            values.swap(a, b);
        }
    }
    values
}
