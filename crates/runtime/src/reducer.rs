//! Action stamping and the append-only action log.
//!
//! [`RuntimeReducer`] owns the current [`RuntimeState`] of one attempt. Each
//! dispatched action is stamped with the milliseconds elapsed since the
//! attempt started, applied through the [`ChallengeEngine`], and appended to
//! the log. A rejected action leaves state, log and size untouched.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use challenge_core::{
    Action, ActionLogEntry, ActionMetadata, ActionSet, Challenge, ChallengeEngine,
    ChallengeMetadata,
};

use crate::api::Result;

/// Size of an empty log: the encoded `[]`.
pub const EMPTY_LOG_SIZE: usize = 2;

/// Bookkeeping that travels with the challenge state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeMetadata {
    pub challenge_metadata: ChallengeMetadata,
    pub action_log: Vec<ActionLogEntry>,
    /// Approximate encoded size of `action_log` in bytes. Never decreases.
    pub size: usize,
}

impl RuntimeMetadata {
    pub fn new(challenge_metadata: ChallengeMetadata) -> Self {
        Self {
            challenge_metadata,
            action_log: Vec::new(),
            size: EMPTY_LOG_SIZE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuntimeState<S> {
    pub state: S,
    pub metadata: RuntimeMetadata,
}

pub struct RuntimeReducer<C: Challenge> {
    engine: Arc<ChallengeEngine<C>>,
    current: RuntimeState<C::State>,
    started: Instant,
}

impl<C: Challenge> RuntimeReducer<C> {
    /// Builds the initial state for `challenge_metadata` and starts the clock.
    pub fn init(engine: Arc<ChallengeEngine<C>>, challenge_metadata: ChallengeMetadata) -> Self {
        let state = engine.initialize(&challenge_metadata);
        Self {
            engine,
            current: RuntimeState {
                state,
                metadata: RuntimeMetadata::new(challenge_metadata),
            },
            started: Instant::now(),
        }
    }

    pub fn engine(&self) -> &ChallengeEngine<C> {
        &self.engine
    }

    pub fn current(&self) -> &RuntimeState<C::State> {
        &self.current
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Milliseconds since the attempt started, rounded to nearest.
    fn stamp(&self) -> u64 {
        let micros = self.elapsed().as_micros();
        u64::try_from((micros + 500) / 1000).unwrap_or(u64::MAX)
    }

    /// Stamps and applies a typed action.
    pub fn dispatch(&mut self, action: C::Action) -> Result<&RuntimeState<C::State>> {
        let metadata = ActionMetadata::at(self.stamp());
        let wire = action.encode(metadata)?;
        let entry = ActionLogEntry::from(wire);
        let next = self.engine.apply(&self.current.state, action, metadata);
        self.commit(next, entry)
    }

    /// Stamps and applies an action given by its wire kind and payload.
    pub fn dispatch_raw(&mut self, kind: &str, payload: Value) -> Result<&RuntimeState<C::State>> {
        let action = Action::new(kind, self.stamp(), payload);
        self.reduce(action)
    }

    /// Applies an already-stamped action, as when replaying a recorded log.
    pub fn reduce(&mut self, action: Action) -> Result<&RuntimeState<C::State>> {
        let next = self.engine.update(&self.current.state, &action)?;
        self.commit(next, ActionLogEntry::from(action))
    }

    /// Records `entry` and moves to `next`. A state the challenge cannot score
    /// is refused before anything is recorded.
    fn commit(&mut self, next: C::State, entry: ActionLogEntry) -> Result<&RuntimeState<C::State>> {
        self.engine.score(&next)?;
        let grown = entry.encoded_len()? + 1;

        debug!(
            target: "runtime::reducer",
            kind = entry.kind(),
            timestamp = entry.timestamp(),
            bytes = grown,
            "action applied"
        );

        let metadata = &mut self.current.metadata;
        metadata.size += grown;
        metadata.action_log.push(entry);
        self.current.state = next;
        Ok(&self.current)
    }
}
