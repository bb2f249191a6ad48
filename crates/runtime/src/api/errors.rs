//! Unified error types surfaced by the runtime API.
//!
//! Challenge failures (bad actions, misconfigured scores) are returned to the
//! caller. Telemetry failures never are: the submitter logs them and reflects
//! them in its status, so [`TelemetryError`] stays inside the crate's workers.
use thiserror::Error;

use challenge_core::ChallengeError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Challenge(#[from] ChallengeError),

    #[error("failed to serialize runtime state")]
    Serialize(#[from] serde_json::Error),
}

impl RuntimeError {
    /// Stable code for logs and the client console.
    pub fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::Challenge(error) => error.error_code(),
            RuntimeError::Serialize(_) => "serialize",
        }
    }
}

/// Failures on the report connection or the completion request.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("report connection failed: {0}")]
    Connect(String),

    #[error("report connection error")]
    Socket(#[source] tokio_tungstenite::tungstenite::Error),

    #[error("report connection closed")]
    Closed,

    #[error("completion submission failed")]
    Http(#[from] reqwest::Error),

    #[error("failed to encode telemetry payload")]
    Encode(#[from] serde_json::Error),
}
