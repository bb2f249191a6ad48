//! Messages streamed to the report collector.
//!
//! Each frame is an independent JSON text message:
//!
//! ```text
//! {"challengeMetadata": {...}, "token": "..."}        registration
//! {"action": ["k", 1520, 7]}                          one log entry
//! {"status": {"state": {...}, "progress": 40, "completed": false}}
//! ```

use serde::Serialize;
use serde_json::Value;

use challenge_core::{ActionLogEntry, ChallengeMetadata};

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReportFrame<'a> {
    Registration {
        #[serde(rename = "challengeMetadata")]
        challenge_metadata: &'a ChallengeMetadata,
        token: &'a str,
    },
    Action {
        action: &'a ActionLogEntry,
    },
    Status {
        status: StatusFrame<'a>,
    },
}

#[derive(Debug, Serialize)]
pub struct StatusFrame<'a> {
    pub state: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    pub completed: bool,
}

impl ReportFrame<'_> {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Body of the one-shot completion request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSubmission {
    pub state: Value,
    pub action_log: Vec<ActionLogEntry>,
    pub challenge_metadata: ChallengeMetadata,
}
