//! Offline verification of a recorded attempt.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use challenge_core::{ActionLogEntry, Challenge, ChallengeEngine, ChallengeMetadata};
use runtime::{RuntimeReducer, governor};
use serde::Deserialize;

/// Shape of a recorded attempt, as posted on completion.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub challenge_metadata: ChallengeMetadata,
    pub action_log: Vec<ActionLogEntry>,
}

impl Recording {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid recording {}", path.display()))
    }
}

/// Rebuilds the recorded attempt and prints its verdict as one JSON line.
pub fn run<C: Challenge>(challenge: C, recording: Recording, log_size_budget: usize) -> Result<()> {
    let engine = Arc::new(ChallengeEngine::new(challenge));
    let mut reducer = RuntimeReducer::init(Arc::clone(&engine), recording.challenge_metadata);

    for (index, entry) in recording.action_log.iter().enumerate() {
        reducer
            .reduce(entry.to_action())
            .with_context(|| format!("action {index} ({}) could not be replayed", entry.kind()))?;
    }

    let current = reducer.current();
    let verdict = serde_json::json!({
        "completed": engine.is_challenge_completed(&current.state),
        "failureReason": engine.failure_reason(&current.state),
        "score": engine.score(&current.state)?,
        "actions": current.metadata.action_log.len(),
        "health": governor::health_percent(current.metadata.size, log_size_budget),
    });
    println!("{verdict}");

    tracing::info!(actions = current.metadata.action_log.len(), "Replay finished");
    Ok(())
}
