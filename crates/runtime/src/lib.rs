//! Runtime for timed, action-sourced challenge attempts.
//!
//! This crate wraps a [`challenge_core::ChallengeEngine`] with everything an
//! attempt needs at run time: a clock for stamping actions, the append-only
//! action log, the log-size and time budgets, and best-effort telemetry to a
//! remote collector. Consumers start attempts through [`ChallengeRunner`] and
//! drive them through [`Attempt`].
//!
//! Modules are organized by responsibility:
//! - [`reducer`] stamps actions and grows the log
//! - [`governor`] turns budgets and challenge rules into an outcome
//! - [`attempt`] hosts the per-attempt orchestrator and the runner
//! - [`telemetry`] streams attempts to the collector
//! - [`api`] and [`config`] expose errors and settings
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod attempt;
pub mod config;
pub mod governor;
pub mod reducer;
pub mod telemetry;

mod workers;

pub use api::{Result, RuntimeError, TelemetryError};
pub use attempt::{Attempt, AttemptStatus, ChallengeRunner};
pub use config::{DEFAULT_LOG_SIZE_BUDGET, RuntimeConfig, TelemetryConfig, TelemetryEndpoints};
pub use governor::{AttemptOutcome, FailureReason, ResourceGovernor, TimePoll};
pub use reducer::{RuntimeMetadata, RuntimeReducer, RuntimeState};
pub use telemetry::{
    ChallengeSubmitter, FrameSink, FrameStream, NullSubmitter, ReportTransport, StateReport,
    StatusWatcher, SubmitterStatus, TelemetrySubmitter, WebSocketTransport, create_submitter,
    create_submitter_with,
};
pub use workers::SUBMISSION_TOKEN_HEADER;
