//! Error types raised by pure challenge logic.
//!
//! Everything here is a programmer error or corrupted input: a broken
//! challenge definition, a log produced by a different definition, or a
//! mis-weighted score. Callers are expected to surface these loudly rather
//! than recover.

use crate::score::ScoreConfigurationError;

/// Errors surfaced by [`ChallengeEngine`](crate::ChallengeEngine).
#[derive(Debug, thiserror::Error)]
pub enum ChallengeError {
    #[error("action handler not found for action type: {kind}")]
    UnknownActionKind { kind: String },

    #[error("invalid payload for action type {kind}: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    ScoreConfiguration(#[from] ScoreConfigurationError),
}

impl ChallengeError {
    /// Returns a static identifier for this error variant.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownActionKind { .. } => "unknown_action_kind",
            Self::InvalidPayload { .. } => "invalid_payload",
            Self::ScoreConfiguration(_) => "score_configuration",
        }
    }
}
