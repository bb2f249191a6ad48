use std::time::Duration;

use challenge_core::{
    Action, ActionMetadata, ActionSet, Challenge, ChallengeEngine, ChallengeError,
    ChallengeMetadata, ScoreConfigurationError, ScoreKeeper,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct FormState {
    seed: String,
    text: String,
    checked: bool,
    clicks: u32,
    last_timestamp: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, strum::VariantNames, strum::IntoStaticStr)]
#[serde(tag = "type", content = "payload")]
enum FormAction {
    #[serde(rename = "a")]
    #[strum(serialize = "a")]
    SetText(String),
    #[serde(rename = "b")]
    #[strum(serialize = "b")]
    Check(bool),
    #[serde(rename = "c")]
    #[strum(serialize = "c")]
    Increment(Value),
}

struct FormChallenge;

impl Challenge for FormChallenge {
    type State = FormState;
    type Action = FormAction;

    fn time_limit(&self) -> Duration {
        Duration::from_secs(5)
    }

    fn initialize(&self, metadata: &ChallengeMetadata) -> FormState {
        FormState {
            seed: metadata.seed.clone(),
            text: String::new(),
            checked: false,
            clicks: 0,
            last_timestamp: 0,
        }
    }

    fn apply(&self, draft: &mut FormState, action: FormAction, metadata: ActionMetadata) {
        match action {
            FormAction::SetText(text) => draft.text = text,
            FormAction::Check(checked) => draft.checked = checked,
            FormAction::Increment(_) => draft.clicks += 1,
        }
        draft.last_timestamp = metadata.timestamp;
    }

    fn is_completed(&self, state: &FormState) -> bool {
        state.checked && state.clicks >= 3
    }

    fn failure_reason(&self, state: &FormState) -> Option<String> {
        (state.clicks > 5).then(|| "Too many clicks".to_owned())
    }

    fn score(&self, state: &FormState) -> Result<Option<u32>, ScoreConfigurationError> {
        let mut score = ScoreKeeper::new();
        score.add(50, f64::from(state.clicks.min(3)) / 3.0);
        score.add(50, if state.checked { 1.0 } else { 0.0 });
        score.final_score().map(Some)
    }
}

fn metadata(seed: &str) -> ChallengeMetadata {
    ChallengeMetadata::new(seed, 1_700_000_000_000, Uuid::from_u128(7))
}

fn sample_log() -> Vec<Action> {
    vec![
        Action::new("a", 10, json!("hello")),
        Action::new("b", 20, json!(true)),
        Action::new("c", 30, json!([])),
        Action::new("c", 40, Value::Null),
    ]
}

#[test]
fn initialize_creates_state() {
    let engine = ChallengeEngine::new(FormChallenge);
    let state = engine.initialize(&metadata("seed"));

    assert_eq!(
        serde_json::to_value(&state).unwrap(),
        json!({ "seed": "seed", "text": "", "checked": false, "clicks": 0, "last_timestamp": 0 })
    );
}

#[test]
fn replay_is_deterministic() {
    let engine = ChallengeEngine::new(FormChallenge);
    let log = sample_log();

    let first = engine.replay(&metadata("x"), &log).unwrap();
    let second = engine.replay(&metadata("x"), &log).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.text, "hello");
    assert!(first.checked);
    assert_eq!(first.clicks, 2);
    assert_eq!(first.last_timestamp, 40);
}

#[test]
fn update_leaves_argument_untouched() {
    let engine = ChallengeEngine::new(FormChallenge);
    let initial = engine.initialize(&metadata("x"));
    let snapshot = serde_json::to_vec(&initial).unwrap();

    let mut state = initial.clone();
    for action in sample_log() {
        let before = serde_json::to_vec(&state).unwrap();
        let next = engine.update(&state, &action).unwrap();
        assert_eq!(serde_json::to_vec(&state).unwrap(), before);
        state = next;
    }

    assert_eq!(serde_json::to_vec(&initial).unwrap(), snapshot);
    assert_ne!(state, initial);
}

#[test]
fn unknown_action_fails_without_state_change() {
    let engine = ChallengeEngine::new(FormChallenge);
    let state = engine.initialize(&metadata("x"));
    let before = state.clone();

    let result = engine.update(&state, &Action::new("__nonexistent__", 0, Value::Null));

    assert!(matches!(result, Err(ChallengeError::UnknownActionKind { .. })));
    assert_eq!(state, before);
}

#[test]
fn invalid_payload_is_rejected() {
    let engine = ChallengeEngine::new(FormChallenge);
    let state = engine.initialize(&metadata("x"));

    let result = engine.update(&state, &Action::new("b", 0, json!("yes")));

    let error = result.unwrap_err();
    assert_eq!(error.error_code(), "invalid_payload");
}

#[test]
fn replay_stops_at_first_bad_action() {
    let engine = ChallengeEngine::new(FormChallenge);
    let mut log = sample_log();
    log.insert(1, Action::new("z", 15, Value::Null));

    let result = engine.replay(&metadata("x"), &log);
    assert!(matches!(result, Err(ChallengeError::UnknownActionKind { ref kind }) if kind == "z"));
}

#[test]
fn typed_path_matches_wire_path() {
    let engine = ChallengeEngine::new(FormChallenge);
    let state = engine.initialize(&metadata("x"));
    let meta = ActionMetadata::at(99);

    let typed = engine.apply(&state, FormAction::SetText("typed".into()), meta);
    let wire = FormAction::SetText("typed".into()).encode(meta).unwrap();
    let decoded = engine.update(&state, &wire).unwrap();

    assert_eq!(typed, decoded);
}

#[test]
fn inspection_reads_outcome() {
    let engine = ChallengeEngine::new(FormChallenge);
    let mut state = engine.initialize(&metadata("x"));
    assert!(!engine.is_challenge_completed(&state));
    assert_eq!(engine.score(&state).unwrap(), Some(0));

    for timestamp in 0..3 {
        state = engine.apply(&state, FormAction::Increment(Value::Null), ActionMetadata::at(timestamp));
    }
    state = engine.apply(&state, FormAction::Check(true), ActionMetadata::at(4));

    assert!(engine.is_challenge_completed(&state));
    assert_eq!(engine.failure_reason(&state), None);
    assert_eq!(engine.score(&state).unwrap(), Some(100));

    for timestamp in 5..8 {
        state = engine.apply(&state, FormAction::Increment(Value::Null), ActionMetadata::at(timestamp));
    }
    assert_eq!(engine.failure_reason(&state).as_deref(), Some("Too many clicks"));
}
