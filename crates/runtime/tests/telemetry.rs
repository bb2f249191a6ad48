//! Streaming and submission behaviour of the telemetry submitter.

mod common;

use std::sync::Arc;
use std::time::Duration;

use challenge_content::{HuntingAction, HuntingChallenge, SortingAction, SortingChallenge, hunting};
use challenge_core::{ChallengeMetadata, ActionLogEntry};
use runtime::{
    ChallengeRunner, ChallengeSubmitter, RuntimeConfig, RuntimeMetadata, StateReport,
    SubmitterStatus, TelemetryConfig, TelemetryEndpoints, TelemetrySubmitter,
};
use serde_json::{Value, json};
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{LopsidedAction, LopsidedChallenge, kind_of, memory_transport};

fn metadata() -> ChallengeMetadata {
    ChallengeMetadata::new("telemetry", 1_700_000_000_000, Uuid::from_u128(77))
}

fn config(submit_url: &str) -> RuntimeConfig {
    RuntimeConfig {
        telemetry: TelemetryConfig {
            submit_url: Some(submit_url.to_owned()),
            report_url: Some("ws://collector.test/report".to_owned()),
            token: Some("tok".to_owned()),
            close_grace: Duration::from_millis(200),
        },
        ..RuntimeConfig::default()
    }
}

fn endpoints() -> TelemetryEndpoints {
    TelemetryEndpoints {
        submit_url: "http://collector.test/submit".into(),
        report_url: "ws://collector.test/report".into(),
        token: "tok".into(),
    }
}

#[tokio::test]
async fn frames_queued_before_open_flush_in_order() {
    let (transport, mut collector) = memory_transport();
    let runner = ChallengeRunner::new(SortingChallenge, config("http://collector.test/submit"))
        .with_transport(Arc::new(transport));

    let mut attempt = runner.start_with(metadata()).unwrap();
    attempt.dispatch(SortingAction::Select(0)).unwrap();
    attempt.dispatch(SortingAction::Over(3)).unwrap();
    assert_eq!(attempt.submitter_status(), SubmitterStatus::Connecting);

    let mut watcher = attempt.subscribe();
    collector.open();
    assert_eq!(
        watcher.wait_for(|status| status == SubmitterStatus::Connected).await,
        Some(SubmitterStatus::Connected)
    );

    let mut frames = Vec::new();
    for _ in 0..6 {
        frames.push(collector.next_frame().await);
    }
    let kinds: Vec<_> = frames.iter().map(kind_of).collect();
    assert_eq!(
        kinds,
        ["registration", "status", "action", "status", "action", "status"]
    );

    assert_eq!(frames[0]["token"], "tok");
    assert_eq!(frames[0]["challengeMetadata"]["seed"], "telemetry");
    assert_eq!(frames[2]["action"][0], "s");
    assert_eq!(frames[2]["action"][2], 0);
    assert_eq!(frames[4]["action"][0], "o");
    assert_eq!(frames[5]["status"]["state"]["target_index"], 3);
    assert_eq!(frames[5]["status"]["completed"], false);
    assert_eq!(frames[5]["status"]["progress"], 0);

    // After the flush frames go straight out.
    attempt.dispatch(SortingAction::End(Value::Null)).unwrap();
    assert_eq!(collector.next_frame().await["action"][0], "e");
    assert_eq!(kind_of(&collector.next_frame().await), "status");
}

#[tokio::test]
async fn unchanged_state_sends_no_status_frame() {
    let (transport, mut collector) = memory_transport();
    let runner = ChallengeRunner::new(SortingChallenge, config("http://collector.test/submit"))
        .with_transport(Arc::new(transport));
    collector.open();

    let mut attempt = runner.start_with(metadata()).unwrap();
    // Drop with nothing selected leaves the state as it was.
    attempt.dispatch(SortingAction::Drop(4)).unwrap();
    attempt.dispatch(SortingAction::Over(2)).unwrap();

    let kinds: Vec<_> = [
        collector.next_frame().await,
        collector.next_frame().await,
        collector.next_frame().await,
        collector.next_frame().await,
        collector.next_frame().await,
    ]
    .iter()
    .map(kind_of)
    .collect();
    assert_eq!(kinds, ["registration", "status", "action", "action", "status"]);
}

#[tokio::test]
async fn refused_transition_sends_no_frames() {
    let (transport, mut collector) = memory_transport();
    let runner = ChallengeRunner::new(LopsidedChallenge, config("http://collector.test/submit"))
        .with_transport(Arc::new(transport));
    collector.open();

    let mut attempt = runner.start_with(metadata()).unwrap();
    assert!(attempt.dispatch(LopsidedAction::Click(Value::Null)).is_err());
    attempt.dispatch(LopsidedAction::Hover(Value::Null)).unwrap();

    let frames = [
        collector.next_frame().await,
        collector.next_frame().await,
        collector.next_frame().await,
        collector.next_frame().await,
    ];
    let kinds: Vec<_> = frames.iter().map(kind_of).collect();
    assert_eq!(kinds, ["registration", "status", "action", "status"]);
    assert_eq!(frames[2]["action"][0], "h");
    assert_eq!(frames[3]["status"]["state"]["clicks"], 0);
    assert_eq!(frames[3]["status"]["state"]["hovered"], true);
    assert_eq!(frames[3]["status"]["progress"], 50);
    assert!(collector.drain_ready().is_empty());
}

#[tokio::test]
async fn completion_is_submitted_exactly_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(header("x-submission-token", "tok"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (transport, mut collector) = memory_transport();
    let runner = ChallengeRunner::new(HuntingChallenge, config(&format!("{}/submit", server.uri())))
        .with_transport(Arc::new(transport));
    collector.open();

    let mut attempt = runner.start_with(metadata()).unwrap();
    let mut watcher = attempt.subscribe();
    for index in hunting::target_indices(&attempt.state().seed) {
        attempt.dispatch(HuntingAction::Click(index)).unwrap();
    }
    // Still completed; must not submit again.
    attempt.dispatch(HuntingAction::Hover(1)).unwrap();
    attempt.dispatch(HuntingAction::Leave(1)).unwrap();

    let settled = watcher
        .wait_for(|status| {
            matches!(status, SubmitterStatus::Submitted | SubmitterStatus::SubmissionFailed)
        })
        .await;
    assert_eq!(settled, Some(SubmitterStatus::Submitted));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["challengeMetadata"]["attemptId"], Uuid::from_u128(77).to_string());
    assert_eq!(body["actionLog"].as_array().unwrap().len(), 5);
    assert_eq!(body["actionLog"][0][0], "c");
    assert!(body["state"]["clicked_indices"].is_array());

    // Submission status wins over the connection status.
    collector.hang_up();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(attempt.submitter_status(), SubmitterStatus::Submitted);
}

#[tokio::test]
async fn rejected_submission_is_reported_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (transport, mut collector) = memory_transport();
    let runner = ChallengeRunner::new(HuntingChallenge, config(&format!("{}/submit", server.uri())))
        .with_transport(Arc::new(transport));
    collector.open();

    let mut attempt = runner.start_with(metadata()).unwrap();
    let mut watcher = attempt.subscribe();
    for index in hunting::target_indices(&attempt.state().seed) {
        assert!(attempt.dispatch(HuntingAction::Click(index)).is_ok());
    }

    let settled = watcher
        .wait_for(|status| {
            matches!(status, SubmitterStatus::Submitted | SubmitterStatus::SubmissionFailed)
        })
        .await;
    assert_eq!(settled, Some(SubmitterStatus::SubmissionFailed));
}

#[tokio::test]
async fn refused_connection_only_changes_status() {
    let (transport, mut collector) = memory_transport();
    let runner = ChallengeRunner::new(SortingChallenge, config("http://collector.test/submit"))
        .with_transport(Arc::new(transport));

    let mut attempt = runner.start_with(metadata()).unwrap();
    let mut watcher = attempt.subscribe();
    collector.refuse();

    assert_eq!(
        watcher.wait_for(|status| status == SubmitterStatus::Disconnected).await,
        Some(SubmitterStatus::Disconnected)
    );
    assert!(attempt.dispatch(SortingAction::Over(1)).is_ok());
    assert!(collector.until_closed().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn finish_closes_after_grace_period() {
    let (transport, mut collector) = memory_transport();
    let runner = ChallengeRunner::new(SortingChallenge, config("http://collector.test/submit"))
        .with_transport(Arc::new(transport));
    collector.open();

    let mut attempt = runner.start_with(metadata()).unwrap();
    attempt.dispatch(SortingAction::Over(1)).unwrap();
    let mut watcher = attempt.subscribe();
    attempt.finish();

    let frames = collector.until_closed().await;
    assert_eq!(frames.len(), 4);
    assert_eq!(
        watcher.wait_for(|status| status == SubmitterStatus::Disconnected).await,
        Some(SubmitterStatus::Disconnected)
    );
}

#[tokio::test(start_paused = true)]
async fn reactivation_cancels_pending_close() {
    let (transport, mut collector) = memory_transport();
    let transport = Arc::new(transport);
    let mut submitter =
        TelemetrySubmitter::new(endpoints(), Duration::from_secs(1), transport.clone());
    let mut watcher = submitter.subscribe();

    submitter.activate();
    collector.open();
    watcher.wait_for(|status| status == SubmitterStatus::Connected).await;

    submitter.deactivate();
    tokio::time::sleep(Duration::from_millis(500)).await;
    submitter.activate();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(submitter.status(), SubmitterStatus::Connected);
    assert_eq!(transport.connects(), 1);

    let metadata = RuntimeMetadata {
        challenge_metadata: metadata(),
        action_log: vec![ActionLogEntry("o".into(), 3, json!(1))],
        size: 14,
    };
    let state = json!({ "n": 1 });
    submitter.handle_state(StateReport {
        state: &state,
        metadata: &metadata,
        progress: None,
        completed: false,
    });

    let kinds: Vec<_> = [
        collector.next_frame().await,
        collector.next_frame().await,
        collector.next_frame().await,
    ]
    .iter()
    .map(kind_of)
    .collect();
    assert_eq!(kinds, ["registration", "action", "status"]);
}
