//! Attempt identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a single attempt.
///
/// Created once when an attempt starts and never modified afterwards. It is
/// the only input to [`Challenge::initialize`](crate::Challenge::initialize),
/// so two attempts with equal metadata produce equal initial states.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeMetadata {
    /// Challenge seed chosen by the embedding page.
    pub seed: String,

    /// Wall-clock start of the attempt in milliseconds since the Unix epoch.
    pub start_time: i64,

    /// Unique attempt identifier.
    pub attempt_id: Uuid,
}

impl ChallengeMetadata {
    pub fn new(seed: impl Into<String>, start_time: i64, attempt_id: Uuid) -> Self {
        Self {
            seed: seed.into(),
            start_time,
            attempt_id,
        }
    }
}
