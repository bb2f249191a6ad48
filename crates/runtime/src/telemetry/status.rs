//! Submitter status and how observers follow it.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

/// Status shown to the participant.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, strum::Display, strum::IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SubmitterStatus {
    Offline,
    Connecting,
    Connected,
    Disconnected,
    Submitting,
    Submitted,
    SubmissionFailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Offline,
    Connecting,
    Connected,
    Disconnected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionState {
    Submitting,
    Submitted,
    Failed,
}

/// Both halves of the status; submission, once set, is what gets shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusParts {
    pub connection: ConnectionState,
    pub submission: Option<SubmissionState>,
}

impl StatusParts {
    pub fn effective(&self) -> SubmitterStatus {
        match self.submission {
            Some(SubmissionState::Submitting) => SubmitterStatus::Submitting,
            Some(SubmissionState::Submitted) => SubmitterStatus::Submitted,
            Some(SubmissionState::Failed) => SubmitterStatus::SubmissionFailed,
            None => match self.connection {
                ConnectionState::Offline => SubmitterStatus::Offline,
                ConnectionState::Connecting => SubmitterStatus::Connecting,
                ConnectionState::Connected => SubmitterStatus::Connected,
                ConnectionState::Disconnected => SubmitterStatus::Disconnected,
            },
        }
    }
}

/// Writer side of a submitter's status, shared with its workers.
#[derive(Clone, Debug)]
pub(crate) struct StatusBoard {
    tx: Arc<watch::Sender<StatusParts>>,
}

impl StatusBoard {
    pub(crate) fn new(connection: ConnectionState) -> Self {
        let (tx, _) = watch::channel(StatusParts {
            connection,
            submission: None,
        });
        Self { tx: Arc::new(tx) }
    }

    pub(crate) fn set_connection(&self, connection: ConnectionState) {
        self.tx.send_if_modified(|parts| {
            let changed = parts.connection != connection;
            parts.connection = connection;
            changed
        });
    }

    pub(crate) fn set_submission(&self, submission: SubmissionState) {
        self.tx.send_modify(|parts| parts.submission = Some(submission));
    }

    pub(crate) fn current(&self) -> SubmitterStatus {
        self.tx.borrow().effective()
    }

    pub(crate) fn watch(&self) -> StatusWatcher {
        StatusWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

/// Observer handle for a submitter's status. Dropping it unsubscribes.
#[derive(Clone, Debug)]
pub struct StatusWatcher {
    rx: watch::Receiver<StatusParts>,
}

impl StatusWatcher {
    pub fn current(&self) -> SubmitterStatus {
        self.rx.borrow().effective()
    }

    /// Waits for the next change, or `None` once the submitter is gone.
    pub async fn changed(&mut self) -> Option<SubmitterStatus> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().effective())
    }

    /// Waits until the status satisfies `done`, or `None` once the submitter
    /// is gone without getting there.
    pub async fn wait_for(
        &mut self,
        mut done: impl FnMut(SubmitterStatus) -> bool,
    ) -> Option<SubmitterStatus> {
        self.rx
            .wait_for(|parts| done(parts.effective()))
            .await
            .ok()
            .map(|parts| parts.effective())
    }
}
