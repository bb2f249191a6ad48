//! Line-oriented console for one attempt.
//!
//! Each stdin line is a JSON action `{"type": ..., "payload": ...}`. After
//! every accepted action, and when time runs out, the attempt status is
//! printed to stdout as one JSON line.

use std::time::Duration;

use anyhow::Result;
use challenge_core::Challenge;
use runtime::{Attempt, AttemptStatus, ChallengeRunner, RuntimeConfig, SubmitterStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Longest wait for an in-flight completion submission before exiting.
const SUBMISSION_WAIT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ConsoleAction {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusLine<'a> {
    #[serde(flatten)]
    status: &'a AttemptStatus,
    submitter: SubmitterStatus,
    actions: usize,
}

pub async fn run<C: Challenge>(challenge: C, config: RuntimeConfig, seed: String) -> Result<()> {
    let poll_interval = config.poll_interval;
    let close_grace = config.telemetry.close_grace;
    let runner = ChallengeRunner::new(challenge, config);
    let mut attempt = runner.start(seed)?;

    info!(
        attempt_id = %attempt.metadata().attempt_id,
        time_limit_secs = runner.engine().time_limit().as_secs(),
        "Attempt started; enter one JSON action per line"
    );
    print_status(&attempt, &attempt.status()?)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let status = match handle_line(&mut attempt, &line) {
                    Ok(status) => status,
                    Err(error) => {
                        warn!(error = %error, "action rejected");
                        continue;
                    }
                };
                print_status(&attempt, &status)?;
                if status.outcome.is_finished() {
                    break;
                }
            }
            _ = ticker.tick() => {
                if let Some(status) = attempt.poll_time()? {
                    print_status(&attempt, &status)?;
                    break;
                }
            }
        }
    }

    wait_for_submission(&attempt).await;

    let final_status = attempt.status()?;
    match final_status.outcome.failure() {
        Some(reason) => info!(reason = %reason, "Attempt failed"),
        None if final_status.is_completed() => info!(score = ?final_status.progress, "Attempt completed"),
        None => info!("Attempt abandoned"),
    }

    attempt.finish();
    // Let the report stream close cleanly before the runtime goes away.
    tokio::time::sleep(close_grace + Duration::from_millis(100)).await;
    Ok(())
}

fn handle_line<C: Challenge>(attempt: &mut Attempt<C>, line: &str) -> Result<AttemptStatus> {
    let action: ConsoleAction = serde_json::from_str(line)?;
    Ok(attempt.dispatch_raw(&action.kind, action.payload)?)
}

fn print_status<C: Challenge>(attempt: &Attempt<C>, status: &AttemptStatus) -> Result<()> {
    let line = StatusLine {
        status,
        submitter: attempt.submitter_status(),
        actions: attempt.action_log().len(),
    };
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}

async fn wait_for_submission<C: Challenge>(attempt: &Attempt<C>) {
    if attempt.submitter_status() != SubmitterStatus::Submitting {
        return;
    }

    let mut watcher = attempt.subscribe();
    let settled = tokio::time::timeout(
        SUBMISSION_WAIT,
        watcher.wait_for(|status| status != SubmitterStatus::Submitting),
    )
    .await;

    match settled {
        Ok(Some(status)) => info!(status = %status, "Submission settled"),
        Ok(None) => warn!("Submitter went away during submission"),
        Err(_) => warn!("Gave up waiting for submission"),
    }
}
