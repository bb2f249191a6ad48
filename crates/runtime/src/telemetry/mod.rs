//! Reporting attempts to the remote collector.
//!
//! A [`ChallengeSubmitter`] observes every runtime snapshot of an attempt.
//! When telemetry is configured it is a [`TelemetrySubmitter`], which streams
//! registration, action and status frames over a report connection and posts
//! the attempt once it completes. Otherwise it is a [`NullSubmitter`] that
//! stays `offline` and does nothing.
//!
//! Telemetry is best effort: failures are logged and shown through
//! [`SubmitterStatus`], never returned to the caller.

mod frame;
mod queue;
mod status;
mod submitter;
mod transport;

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::config::TelemetryConfig;
use crate::reducer::RuntimeMetadata;

pub use frame::{CompletionSubmission, ReportFrame, StatusFrame};
pub use queue::OutboundQueue;
pub use status::{ConnectionState, StatusParts, StatusWatcher, SubmissionState, SubmitterStatus};
pub(crate) use status::StatusBoard;
pub use submitter::TelemetrySubmitter;
pub use transport::{FrameSink, FrameStream, ReportTransport, WebSocketTransport};

/// One runtime snapshot as seen by a submitter.
#[derive(Clone, Copy, Debug)]
pub struct StateReport<'a> {
    /// Challenge state, already in its JSON form.
    pub state: &'a Value,
    pub metadata: &'a RuntimeMetadata,
    /// Partial score, when the challenge awards one.
    pub progress: Option<u32>,
    pub completed: bool,
}

pub trait ChallengeSubmitter: Send {
    /// Observes the latest snapshot. Called after every transition.
    fn handle_state(&mut self, report: StateReport<'_>);

    /// Opens the report connection on first call; cancels a pending close.
    fn activate(&mut self);

    /// Closes the report connection after a grace period.
    fn deactivate(&mut self);

    fn status(&self) -> SubmitterStatus;

    fn subscribe(&self) -> StatusWatcher;
}

/// Submitter used when telemetry is not configured.
#[derive(Debug)]
pub struct NullSubmitter {
    status: StatusBoard,
}

impl Default for NullSubmitter {
    fn default() -> Self {
        Self {
            status: StatusBoard::new(ConnectionState::Offline),
        }
    }
}

impl NullSubmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChallengeSubmitter for NullSubmitter {
    fn handle_state(&mut self, _report: StateReport<'_>) {}

    fn activate(&mut self) {}

    fn deactivate(&mut self) {}

    fn status(&self) -> SubmitterStatus {
        self.status.current()
    }

    fn subscribe(&self) -> StatusWatcher {
        self.status.watch()
    }
}

/// Picks the submitter for `config`, reporting over WebSocket.
pub fn create_submitter(config: &TelemetryConfig) -> Box<dyn ChallengeSubmitter> {
    create_submitter_with(config, Arc::new(WebSocketTransport))
}

/// Picks the submitter for `config`, reporting over `transport`.
pub fn create_submitter_with(
    config: &TelemetryConfig,
    transport: Arc<dyn ReportTransport>,
) -> Box<dyn ChallengeSubmitter> {
    match config.endpoints() {
        Some(endpoints) => {
            info!(
                target: "runtime::telemetry",
                report_url = %endpoints.report_url,
                submit_url = %endpoints.submit_url,
                "telemetry enabled"
            );
            Box::new(TelemetrySubmitter::new(endpoints, config.close_grace, transport))
        }
        None => {
            info!(target: "runtime::telemetry", "telemetry not configured, running offline");
            Box::new(NullSubmitter::new())
        }
    }
}
