//! One-shot completion submission.

use tracing::{error, info};

use crate::api::TelemetryError;
use crate::telemetry::{CompletionSubmission, StatusBoard, SubmissionState};

pub const SUBMISSION_TOKEN_HEADER: &str = "x-submission-token";

/// Posts the completed attempt once. Never retried.
pub struct SubmissionWorker {
    http: reqwest::Client,
    url: String,
    token: String,
    status: StatusBoard,
}

impl SubmissionWorker {
    pub(crate) fn new(http: reqwest::Client, url: String, token: String, status: StatusBoard) -> Self {
        Self {
            http,
            url,
            token,
            status,
        }
    }

    /// Expects the status to already read `submitting`.
    pub async fn run(self, submission: CompletionSubmission) {
        match self.post(&submission).await {
            Ok(()) => {
                info!(
                    target: "runtime::telemetry",
                    attempt_id = %submission.challenge_metadata.attempt_id,
                    actions = submission.action_log.len(),
                    "attempt submitted"
                );
                self.status.set_submission(SubmissionState::Submitted);
            }
            Err(error) => {
                error!(
                    target: "runtime::telemetry",
                    attempt_id = %submission.challenge_metadata.attempt_id,
                    error = %error,
                    "attempt submission failed"
                );
                self.status.set_submission(SubmissionState::Failed);
            }
        }
    }

    async fn post(&self, submission: &CompletionSubmission) -> Result<(), TelemetryError> {
        self.http
            .post(&self.url)
            .header(SUBMISSION_TOKEN_HEADER, &self.token)
            .json(submission)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
