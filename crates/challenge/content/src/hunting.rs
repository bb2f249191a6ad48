//! Find the five target numbers on an 8x8 board.

use std::collections::BTreeSet;
use std::time::Duration;

use challenge_core::{
    ActionMetadata, Challenge, ChallengeMetadata, ScoreConfigurationError, ScoreKeeper, digest_hex,
};
use serde::{Deserialize, Serialize};

pub const BOARD_CELLS: i64 = 64;
const TARGET_COUNT: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HuntingState {
    pub seed: String,
    pub hover_index: Option<i64>,
    pub clicked_indices: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, strum::VariantNames, strum::IntoStaticStr)]
#[serde(tag = "type", content = "payload")]
pub enum HuntingAction {
    #[serde(rename = "h")]
    #[strum(serialize = "h")]
    Hover(i64),

    #[serde(rename = "l")]
    #[strum(serialize = "l")]
    Leave(i64),

    #[serde(rename = "c")]
    #[strum(serialize = "c")]
    Click(i64),
}

/// Number shown in cell `index`. Indices off the board still hash to a
/// number.
pub fn number_at(seed: &str, index: i64) -> u32 {
    let hash = digest_hex(format!("{seed}-{index}"));
    u32::from_str_radix(&hash[..4], 16).unwrap_or(0)
}

/// Cells holding the numbers to find, in discovery order.
pub fn target_indices(seed: &str) -> Vec<i64> {
    let hash = digest_hex(format!("target:{seed}"));
    let mut seen = BTreeSet::new();
    hash.as_bytes()
        .chunks(2)
        .filter_map(|pair| std::str::from_utf8(pair).ok())
        .filter_map(|pair| i64::from_str_radix(pair, 16).ok())
        .map(|byte| byte % BOARD_CELLS)
        .filter(|index| seen.insert(*index))
        .take(TARGET_COUNT)
        .collect()
}

pub fn target_numbers(seed: &str) -> Vec<u32> {
    target_indices(seed)
        .into_iter()
        .map(|index| number_at(seed, index))
        .collect()
}

/// What the clicks so far amount to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    pub failed: bool,
    pub found: BTreeSet<u32>,
    pub targets: Vec<u32>,
}

impl Progress {
    pub fn of(state: &HuntingState) -> Self {
        let targets = target_numbers(&state.seed);
        let mut found = BTreeSet::new();
        let mut failed = false;
        for &index in &state.clicked_indices {
            let number = number_at(&state.seed, index);
            if targets.contains(&number) {
                found.insert(number);
            } else {
                failed = true;
            }
        }
        Self { failed, found, targets }
    }

    fn distinct_targets(&self) -> usize {
        self.targets.iter().collect::<BTreeSet<_>>().len()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HuntingChallenge;

impl Challenge for HuntingChallenge {
    type State = HuntingState;
    type Action = HuntingAction;

    fn time_limit(&self) -> Duration {
        Duration::from_secs(20)
    }

    fn initialize(&self, metadata: &ChallengeMetadata) -> HuntingState {
        HuntingState {
            seed: digest_hex(format!("{}{}", metadata.seed, metadata.attempt_id)),
            hover_index: None,
            clicked_indices: Vec::new(),
        }
    }

    fn apply(&self, draft: &mut HuntingState, action: HuntingAction, _metadata: ActionMetadata) {
        match action {
            HuntingAction::Hover(index) => draft.hover_index = Some(index),
            HuntingAction::Leave(index) => {
                if draft.hover_index == Some(index) {
                    draft.hover_index = None;
                }
            }
            HuntingAction::Click(index) => {
                if !draft.clicked_indices.contains(&index) {
                    draft.clicked_indices.push(index);
                }
            }
        }
    }

    fn is_completed(&self, state: &HuntingState) -> bool {
        let progress = Progress::of(state);
        !progress.failed && progress.found.len() == progress.distinct_targets()
    }

    fn failure_reason(&self, state: &HuntingState) -> Option<String> {
        Progress::of(state)
            .failed
            .then(|| "You clicked on the wrong number.".to_owned())
    }

    fn score(&self, state: &HuntingState) -> Result<Option<u32>, ScoreConfigurationError> {
        let progress = Progress::of(state);
        let mut score = ScoreKeeper::new();
        score.add(100, progress.found.len() as f64 / progress.targets.len() as f64);
        score.final_score().map(Some)
    }
}
