//! Attempt orchestration.
//!
//! An [`Attempt`] ties together the reducer, the governor and the submitter
//! of a single try at a challenge. [`ChallengeRunner`] starts attempts with
//! fresh identities and shares the engine and configuration between them.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use challenge_core::{Action, ActionLogEntry, Challenge, ChallengeEngine, ChallengeMetadata};

use crate::api::Result;
use crate::config::RuntimeConfig;
use crate::governor::{AttemptOutcome, ResourceGovernor};
use crate::reducer::{RuntimeReducer, RuntimeState};
use crate::telemetry::{
    ChallengeSubmitter, ReportTransport, StateReport, StatusWatcher, SubmitterStatus,
    WebSocketTransport, create_submitter_with,
};

/// What the caller shows after every transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptStatus {
    pub outcome: AttemptOutcome,
    pub health: u8,
    pub time_left: u8,
    pub progress: Option<u32>,
}

impl AttemptStatus {
    pub fn is_completed(&self) -> bool {
        self.outcome == AttemptOutcome::Completed
    }
}

pub struct Attempt<C: Challenge> {
    reducer: RuntimeReducer<C>,
    governor: ResourceGovernor,
    submitter: Box<dyn ChallengeSubmitter>,
}

impl<C: Challenge> Attempt<C> {
    /// Starts the clock, activates `submitter` and reports the initial state.
    ///
    /// Fails without activating anything when the initial state cannot be
    /// scored.
    pub fn new(
        engine: Arc<ChallengeEngine<C>>,
        metadata: ChallengeMetadata,
        config: &RuntimeConfig,
        mut submitter: Box<dyn ChallengeSubmitter>,
    ) -> Result<Self> {
        let time_limit = engine.time_limit();
        let reducer = RuntimeReducer::init(engine, metadata);
        let governor = ResourceGovernor::new(time_limit, config.log_size_budget, reducer.started());

        info!(
            target: "runtime::attempt",
            attempt_id = %reducer.current().metadata.challenge_metadata.attempt_id,
            time_limit_ms = time_limit.as_millis() as u64,
            "attempt started"
        );

        let mut attempt = Self {
            reducer,
            governor,
            submitter,
        };
        let status = attempt.status()?;
        attempt.submitter.activate();
        attempt.forward(&status)?;
        Ok(attempt)
    }

    pub fn runtime_state(&self) -> &RuntimeState<C::State> {
        self.reducer.current()
    }

    pub fn state(&self) -> &C::State {
        &self.reducer.current().state
    }

    pub fn metadata(&self) -> &ChallengeMetadata {
        &self.reducer.current().metadata.challenge_metadata
    }

    pub fn action_log(&self) -> &[ActionLogEntry] {
        &self.reducer.current().metadata.action_log
    }

    pub fn submitter_status(&self) -> SubmitterStatus {
        self.submitter.status()
    }

    pub fn subscribe(&self) -> StatusWatcher {
        self.submitter.subscribe()
    }

    pub fn dispatch(&mut self, action: C::Action) -> Result<AttemptStatus> {
        self.reducer.dispatch(action)?;
        self.report()
    }

    pub fn dispatch_raw(&mut self, kind: &str, payload: Value) -> Result<AttemptStatus> {
        self.reducer.dispatch_raw(kind, payload)?;
        self.report()
    }

    /// Applies an already-stamped action.
    pub fn reduce(&mut self, action: Action) -> Result<AttemptStatus> {
        self.reducer.reduce(action)?;
        self.report()
    }

    /// Polling hook for the time limit.
    ///
    /// Returns the fresh status, re-reported to the submitter, on the poll
    /// where time first runs out; `None` otherwise.
    pub fn poll_time(&mut self) -> Result<Option<AttemptStatus>> {
        if !self.governor.poll().expired_now {
            return Ok(None);
        }
        self.report().map(Some)
    }

    /// Current status without touching the clock.
    pub fn status(&self) -> Result<AttemptStatus> {
        let current = self.reducer.current();
        let engine = self.reducer.engine();

        let completed = engine.is_challenge_completed(&current.state);
        let health = self.governor.health(current.metadata.size);
        let outcome =
            self.governor
                .evaluate(completed, engine.failure_reason(&current.state), health);

        Ok(AttemptStatus {
            outcome,
            health,
            time_left: self.governor.time_left(),
            progress: engine.score(&current.state)?,
        })
    }

    /// Deactivates the submitter and hands back the final snapshot.
    pub fn finish(mut self) -> RuntimeState<C::State> {
        self.submitter.deactivate();
        info!(
            target: "runtime::attempt",
            attempt_id = %self.metadata().attempt_id,
            actions = self.action_log().len(),
            "attempt finished"
        );
        self.reducer.current().clone()
    }

    fn report(&mut self) -> Result<AttemptStatus> {
        let status = self.status()?;
        self.forward(&status)?;
        Ok(status)
    }

    fn forward(&mut self, status: &AttemptStatus) -> Result<()> {
        let current = self.reducer.current();
        let state = serde_json::to_value(&current.state)?;

        self.submitter.handle_state(StateReport {
            state: &state,
            metadata: &current.metadata,
            progress: status.progress,
            completed: self.reducer.engine().is_challenge_completed(&current.state),
        });

        debug!(target: "runtime::attempt", status = ?status, "attempt status");
        Ok(())
    }
}

/// Starts attempts of one challenge.
pub struct ChallengeRunner<C: Challenge> {
    engine: Arc<ChallengeEngine<C>>,
    config: RuntimeConfig,
    transport: Arc<dyn ReportTransport>,
}

impl<C: Challenge> ChallengeRunner<C> {
    pub fn new(challenge: C, config: RuntimeConfig) -> Self {
        Self {
            engine: Arc::new(ChallengeEngine::new(challenge)),
            config,
            transport: Arc::new(WebSocketTransport),
        }
    }

    /// Replaces the report transport used by future attempts.
    pub fn with_transport(mut self, transport: Arc<dyn ReportTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn engine(&self) -> &ChallengeEngine<C> {
        &self.engine
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Starts a fresh attempt stamped with the current wall-clock time and a
    /// new time-ordered attempt id.
    pub fn start(&self, seed: impl Into<String>) -> Result<Attempt<C>> {
        let metadata = ChallengeMetadata::new(
            seed,
            chrono::Utc::now().timestamp_millis(),
            Uuid::now_v7(),
        );
        self.start_with(metadata)
    }

    /// Starts an attempt with a given identity.
    pub fn start_with(&self, metadata: ChallengeMetadata) -> Result<Attempt<C>> {
        let submitter = create_submitter_with(&self.config.telemetry, Arc::clone(&self.transport));
        Attempt::new(Arc::clone(&self.engine), metadata, &self.config, submitter)
    }

    /// Finishes `attempt` and starts another with the same seed.
    pub fn reset(&self, attempt: Attempt<C>) -> Result<Attempt<C>> {
        let seed = attempt.metadata().seed.clone();
        attempt.finish();
        self.start(seed)
    }
}
