//! One hundred arithmetic questions typed on a keypad.
//!
//! Questions are derived from a rolling seed that absorbs every key press and
//! its timestamp, so the sequence of questions depends on how the attempt was
//! actually played.

use std::fmt;
use std::time::Duration;

use challenge_core::{ActionMetadata, Challenge, ChallengeMetadata, digest_hex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const QUESTIONS_TO_COMPLETE: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operator {
    const ALL: [Operator; 4] = [Self::Add, Self::Subtract, Self::Multiply, Self::Divide];
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        };
        f.write_str(symbol)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub left: u64,
    pub op: Operator,
    pub right: u64,
}

impl Question {
    /// Expected answer. Division rounds down.
    pub fn evaluate(&self) -> u64 {
        match self.op {
            Operator::Add => self.left.saturating_add(self.right),
            Operator::Subtract => self.left.saturating_sub(self.right),
            Operator::Multiply => self.left.saturating_mul(self.right),
            Operator::Divide => self.left.checked_div(self.right).unwrap_or(0),
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticState {
    pub rng_seed: String,
    pub answer: u64,
    pub question: Question,
    pub completed: u32,
    pub wrong: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, strum::VariantNames, strum::IntoStaticStr)]
#[serde(tag = "type", content = "payload")]
pub enum ArithmeticAction {
    /// A digit key.
    #[serde(rename = "k")]
    #[strum(serialize = "k")]
    Key(u64),

    /// Submits the typed answer.
    #[serde(rename = "a")]
    #[strum(serialize = "a")]
    Answer(Value),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ArithmeticChallenge;

impl Challenge for ArithmeticChallenge {
    type State = ArithmeticState;
    type Action = ArithmeticAction;

    fn time_limit(&self) -> Duration {
        Duration::from_secs(120)
    }

    fn initialize(&self, metadata: &ChallengeMetadata) -> ArithmeticState {
        let rng_seed = digest_hex(format!("{}{}", metadata.seed, metadata.attempt_id));
        ArithmeticState {
            question: generate(&rng_seed, 0),
            rng_seed,
            answer: 0,
            completed: 0,
            wrong: false,
        }
    }

    fn apply(&self, draft: &mut ArithmeticState, action: ArithmeticAction, metadata: ActionMetadata) {
        match action {
            ArithmeticAction::Key(digit) => {
                draft.answer = draft.answer.saturating_mul(10).saturating_add(digit);
                draft.rng_seed = digest_hex(format!("{}{}{}", draft.rng_seed, digit, metadata.timestamp));
            }
            ArithmeticAction::Answer(_) if draft.answer == draft.question.evaluate() => {
                draft.completed += 1;
                draft.question = generate(&draft.rng_seed, draft.completed);
                draft.answer = 0;
                draft.rng_seed = digest_hex(format!("{}{}", draft.rng_seed, metadata.timestamp));
            }
            ArithmeticAction::Answer(_) => draft.wrong = true,
        }
    }

    fn is_completed(&self, state: &ArithmeticState) -> bool {
        state.completed >= QUESTIONS_TO_COMPLETE
    }

    fn failure_reason(&self, state: &ArithmeticState) -> Option<String> {
        state.wrong.then(|| "Incorrect answer was given".to_owned())
    }
}

/// Builds question number `num` from the rolling seed.
///
/// The first twenty questions add, the next twenty subtract, then multiply and
/// divide; later questions pick an operator from the hash. Addition and
/// subtraction operands grow by one hex digit per question from 11 to 16.
pub fn generate(rng_seed: &str, num: u32) -> Question {
    let hash = digest_hex(format!("{rng_seed}{num}"));
    let op = match num {
        0..20 => Operator::Add,
        20..40 => Operator::Subtract,
        40..60 => Operator::Multiply,
        60..80 => Operator::Divide,
        _ => Operator::ALL[usize::from(hash.as_bytes()[0] % 4)],
    };

    match op {
        Operator::Add | Operator::Subtract => {
            let len = 1 + num.saturating_sub(10).min(6) as usize;
            let a = hex_slice(&hash, 1, 1 + len) + 1;
            let b = hex_slice(&hash, 10, 10 + len) + 1;
            if op == Operator::Add {
                Question { left: a, op, right: b }
            } else {
                Question { left: a.max(b), op, right: a.min(b) }
            }
        }
        Operator::Multiply | Operator::Divide => {
            let a = hex_slice(&hash, 1, 7) + 1;
            let b = hex_slice(&hash, 10, 17) + 1;
            if op == Operator::Multiply {
                Question { left: a, op, right: b }
            } else {
                Question { left: a * b, op, right: a }
            }
        }
    }
}

fn hex_slice(hash: &str, start: usize, end: usize) -> u64 {
    hash.get(start..end)
        .and_then(|digits| u64::from_str_radix(digits, 16).ok())
        .unwrap_or(0)
}
