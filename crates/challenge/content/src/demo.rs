//! Three form pages to complete in five seconds.
//!
//! Page 0 asks for a generated text to be typed (pasting fails the attempt),
//! page 1 for a checkbox, page 2 for a counter clicked an exact number of
//! times. "Next" validates the current page.

use std::time::Duration;

use challenge_core::{ActionMetadata, Challenge, ChallengeMetadata, digest_hex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const EXPECTED_TEXT_LEN: usize = 32;
const FINAL_PAGE: u8 = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemoState {
    pub seed: String,
    pub failed: Option<String>,
    pub expected_text: String,
    pub expected_number: u32,
    pub page: u8,
    pub text: String,
    pub checked: bool,
    pub clicks: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, strum::VariantNames, strum::IntoStaticStr)]
#[serde(tag = "type", content = "payload")]
pub enum DemoAction {
    #[serde(rename = "a")]
    #[strum(serialize = "a")]
    SetText(String),

    #[serde(rename = "b")]
    #[strum(serialize = "b")]
    Check(bool),

    #[serde(rename = "c")]
    #[strum(serialize = "c")]
    Increment(Value),

    #[serde(rename = "n")]
    #[strum(serialize = "n")]
    Next(Value),

    #[serde(rename = "p")]
    #[strum(serialize = "p")]
    Paste(Value),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DemoChallenge;

impl Challenge for DemoChallenge {
    type State = DemoState;
    type Action = DemoAction;

    fn time_limit(&self) -> Duration {
        Duration::from_secs(5)
    }

    fn initialize(&self, metadata: &ChallengeMetadata) -> DemoState {
        let material = format!("{}{}", metadata.seed, metadata.attempt_id);
        let mut expected_text = digest_hex(&material);
        expected_text.truncate(EXPECTED_TEXT_LEN);

        let number_hash = digest_hex(format!("{material}x"));
        let first_digit = number_hash
            .chars()
            .next()
            .and_then(|c| c.to_digit(16))
            .unwrap_or(0);

        DemoState {
            seed: metadata.seed.clone(),
            failed: None,
            expected_text,
            expected_number: first_digit + 4,
            page: 0,
            text: String::new(),
            checked: false,
            clicks: 0,
        }
    }

    fn apply(&self, draft: &mut DemoState, action: DemoAction, _metadata: ActionMetadata) {
        match action {
            DemoAction::SetText(text) => draft.text = text,
            DemoAction::Check(checked) => draft.checked = checked,
            DemoAction::Increment(_) => draft.clicks += 1,
            DemoAction::Next(_) => advance(draft),
            DemoAction::Paste(_) => draft.failed = Some("Type the text, not paste it".to_owned()),
        }
    }

    fn is_completed(&self, state: &DemoState) -> bool {
        state.page == FINAL_PAGE
    }

    fn failure_reason(&self, state: &DemoState) -> Option<String> {
        state.failed.clone()
    }
}

fn advance(draft: &mut DemoState) {
    match draft.page {
        0 if draft.text == draft.expected_text => draft.page = 1,
        0 => draft.failed = Some("Incorrect text".to_owned()),
        1 if draft.checked => draft.page = 2,
        1 => draft.failed = Some("Checkbox not checked".to_owned()),
        2 if draft.clicks == draft.expected_number => draft.page = 3,
        2 => draft.failed = Some("Incorrect number of clicks".to_owned()),
        _ => {}
    }
}
