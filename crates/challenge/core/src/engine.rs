//! Challenge contract and the engine that drives it.
//!
//! The [`ChallengeEngine`] is the only place where challenge state changes.
//! It decodes wire actions, routes them to the definition's handler and hands
//! back a fresh state value. The previous state is only ever borrowed, so
//! callers can keep it (for diffing, telemetry or undo) without copying it
//! first.

use std::fmt::Debug;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::action::{Action, ActionMetadata, ActionSet};
use crate::error::ChallengeError;
use crate::metadata::ChallengeMetadata;
use crate::score::ScoreConfigurationError;

/// A pluggable challenge definition.
///
/// Implementors describe how to build the initial state, how each action kind
/// transforms a draft of that state, and how to read the outcome back out.
/// Every method must be deterministic and side-effect free: identical inputs
/// always produce identical outputs.
pub trait Challenge: Send + Sync {
    /// Plain-data challenge state.
    type State: Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync;

    /// Every action kind the challenge accepts.
    type Action: ActionSet + Clone + Debug;

    /// Time allowed for a single attempt.
    fn time_limit(&self) -> Duration;

    /// Builds the initial state from the attempt identity alone.
    fn initialize(&self, metadata: &ChallengeMetadata) -> Self::State;

    /// Applies `action` to a private draft of the state.
    fn apply(&self, draft: &mut Self::State, action: Self::Action, metadata: ActionMetadata);

    fn is_completed(&self, state: &Self::State) -> bool;

    /// Why the attempt failed, if challenge rules say it has.
    fn failure_reason(&self, _state: &Self::State) -> Option<String> {
        None
    }

    /// Partial credit in `0..=100`, for challenges that award it.
    fn score(&self, _state: &Self::State) -> Result<Option<u32>, ScoreConfigurationError> {
        Ok(None)
    }
}

/// Pure initialize/update/inspect wrapper around a [`Challenge`].
#[derive(Clone, Debug, Default)]
pub struct ChallengeEngine<C> {
    challenge: C,
}

impl<C: Challenge> ChallengeEngine<C> {
    pub fn new(challenge: C) -> Self {
        Self { challenge }
    }

    pub fn challenge(&self) -> &C {
        &self.challenge
    }

    pub fn time_limit(&self) -> Duration {
        self.challenge.time_limit()
    }

    pub fn initialize(&self, metadata: &ChallengeMetadata) -> C::State {
        self.challenge.initialize(metadata)
    }

    /// Applies a wire action and returns the resulting state.
    ///
    /// `state` is left untouched; on error no new state is produced.
    pub fn update(&self, state: &C::State, action: &Action) -> Result<C::State, ChallengeError> {
        let typed = C::Action::decode(action)?;
        Ok(self.apply(state, typed, action.metadata()))
    }

    /// Applies an already-typed action and returns the resulting state.
    pub fn apply(&self, state: &C::State, action: C::Action, metadata: ActionMetadata) -> C::State {
        let mut draft = state.clone();
        self.challenge.apply(&mut draft, action, metadata);
        draft
    }

    /// Rebuilds state by folding `actions` over the initial state for `metadata`.
    pub fn replay<'a, I>(&self, metadata: &ChallengeMetadata, actions: I) -> Result<C::State, ChallengeError>
    where
        I: IntoIterator<Item = &'a Action>,
    {
        actions
            .into_iter()
            .try_fold(self.initialize(metadata), |state, action| self.update(&state, action))
    }

    pub fn is_challenge_completed(&self, state: &C::State) -> bool {
        self.challenge.is_completed(state)
    }

    pub fn failure_reason(&self, state: &C::State) -> Option<String> {
        self.challenge.failure_reason(state)
    }

    pub fn score(&self, state: &C::State) -> Result<Option<u32>, ChallengeError> {
        Ok(self.challenge.score(state)?)
    }
}
