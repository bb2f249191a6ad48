//! Streaming submitter that reports an attempt to the collector.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use challenge_core::ChallengeMetadata;

use super::frame::{CompletionSubmission, ReportFrame, StatusFrame};
use super::status::{ConnectionState, StatusBoard, StatusWatcher, SubmissionState, SubmitterStatus};
use super::transport::ReportTransport;
use super::{ChallengeSubmitter, StateReport};
use crate::config::TelemetryEndpoints;
use crate::workers::{ReportCommand, ReportWorker, SubmissionWorker};

/// Reports every transition of one attempt and submits it once completed.
///
/// All network work happens on spawned tasks, so the methods here never
/// block; they must however be called from within a tokio runtime.
pub struct TelemetrySubmitter {
    endpoints: TelemetryEndpoints,
    close_grace: Duration,
    transport: Arc<dyn ReportTransport>,
    http: reqwest::Client,
    status: StatusBoard,

    outbox: mpsc::UnboundedSender<ReportCommand>,
    // Handed to the report worker on first activation.
    mailbox: Option<mpsc::UnboundedReceiver<ReportCommand>>,
    close_timer: Option<JoinHandle<()>>,

    registered: Option<ChallengeMetadata>,
    sent_actions: usize,
    last_state: Option<Value>,
    completed: bool,
}

impl TelemetrySubmitter {
    pub fn new(
        endpoints: TelemetryEndpoints,
        close_grace: Duration,
        transport: Arc<dyn ReportTransport>,
    ) -> Self {
        let (outbox, mailbox) = mpsc::unbounded_channel();
        Self {
            endpoints,
            close_grace,
            transport,
            http: reqwest::Client::new(),
            status: StatusBoard::new(ConnectionState::Connecting),
            outbox,
            mailbox: Some(mailbox),
            close_timer: None,
            registered: None,
            sent_actions: 0,
            last_state: None,
            completed: false,
        }
    }

    fn send(&self, frame: ReportFrame<'_>) {
        let encoded = match frame.encode() {
            Ok(encoded) => encoded,
            Err(error) => {
                error!(target: "runtime::telemetry", error = %error, "failed to encode report frame");
                return;
            }
        };
        if self.outbox.send(ReportCommand::Send(encoded)).is_err() {
            debug!(target: "runtime::telemetry", "report worker stopped, frame dropped");
        }
    }

    fn submit(&self, report: &StateReport<'_>) {
        self.status.set_submission(SubmissionState::Submitting);

        let submission = CompletionSubmission {
            state: report.state.clone(),
            action_log: report.metadata.action_log.clone(),
            challenge_metadata: report.metadata.challenge_metadata.clone(),
        };
        let worker = SubmissionWorker::new(
            self.http.clone(),
            self.endpoints.submit_url.clone(),
            self.endpoints.token.clone(),
            self.status.clone(),
        );

        if spawn(worker.run(submission)).is_none() {
            error!(target: "runtime::telemetry", "no async runtime available for submission");
            self.status.set_submission(SubmissionState::Failed);
        }
    }
}

impl ChallengeSubmitter for TelemetrySubmitter {
    fn handle_state(&mut self, report: StateReport<'_>) {
        let metadata = &report.metadata.challenge_metadata;
        if self.registered.as_ref() != Some(metadata) {
            self.registered = Some(metadata.clone());
            self.sent_actions = 0;
            self.last_state = None;
            self.send(ReportFrame::Registration {
                challenge_metadata: metadata,
                token: &self.endpoints.token,
            });
        }

        let log = &report.metadata.action_log;
        for entry in log.iter().skip(self.sent_actions) {
            self.send(ReportFrame::Action { action: entry });
        }
        self.sent_actions = self.sent_actions.max(log.len());

        if self.last_state.as_ref() != Some(report.state) {
            self.last_state = Some(report.state.clone());
            self.send(ReportFrame::Status {
                status: StatusFrame {
                    state: report.state,
                    progress: report.progress,
                    completed: report.completed,
                },
            });
        }

        if report.completed && !self.completed {
            self.completed = true;
            self.submit(&report);
        }
    }

    fn activate(&mut self) {
        if let Some(mailbox) = self.mailbox.take() {
            let worker = ReportWorker::new(
                self.endpoints.report_url.clone(),
                Arc::clone(&self.transport),
                mailbox,
                self.status.clone(),
            );
            if spawn(worker.run()).is_none() {
                error!(target: "runtime::telemetry", "no async runtime available for report stream");
                self.status.set_connection(ConnectionState::Disconnected);
            }
        }

        if let Some(timer) = self.close_timer.take() {
            debug!(target: "runtime::telemetry", "pending close cancelled");
            timer.abort();
        }
    }

    fn deactivate(&mut self) {
        if self.mailbox.is_some() {
            return;
        }
        if let Some(timer) = self.close_timer.take() {
            timer.abort();
        }

        let outbox = self.outbox.clone();
        let grace = self.close_grace;
        self.close_timer = spawn(async move {
            tokio::time::sleep(grace).await;
            info!(target: "runtime::telemetry", "closing report stream");
            let _ = outbox.send(ReportCommand::Close);
        });
    }

    fn status(&self) -> SubmitterStatus {
        self.status.current()
    }

    fn subscribe(&self) -> StatusWatcher {
        self.status.watch()
    }
}

fn spawn<F>(future: F) -> Option<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    Handle::try_current().ok().map(|handle| handle.spawn(future))
}
