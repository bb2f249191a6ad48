//! Deterministic challenge logic shared by the runtime and offline tools.
//!
//! `challenge-core` defines the contract every challenge satisfies (the
//! [`Challenge`] trait), the wire shape of actions, and the pure
//! initialize/update/inspect API exposed through [`ChallengeEngine`]. State
//! transitions never mutate their input: every update produces a new value,
//! so an action log replayed from the same [`ChallengeMetadata`] always
//! rebuilds the same state.
pub mod action;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod score;
pub mod seed;

pub use action::{Action, ActionLogEntry, ActionMetadata, ActionSet};
pub use engine::{Challenge, ChallengeEngine};
pub use error::ChallengeError;
pub use metadata::ChallengeMetadata;
pub use score::{ScoreConfigurationError, ScoreKeeper};
pub use seed::{DigestStream, digest_hex};
