#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use challenge_core::{ActionMetadata, Challenge, ChallengeMetadata, ScoreConfigurationError, ScoreKeeper};
use futures_util::{sink, stream};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use runtime::{FrameSink, FrameStream, ReportTransport, TelemetryError};

/// Scores fine until clicked; after that its weights only reach 99.
#[derive(Clone, Copy, Debug, Default)]
pub struct LopsidedChallenge;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LopsidedState {
    pub clicks: u32,
    pub hovered: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, strum::VariantNames, strum::IntoStaticStr)]
#[serde(tag = "type", content = "payload")]
pub enum LopsidedAction {
    #[serde(rename = "h")]
    #[strum(serialize = "h")]
    Hover(Value),

    #[serde(rename = "c")]
    #[strum(serialize = "c")]
    Click(Value),
}

impl Challenge for LopsidedChallenge {
    type State = LopsidedState;
    type Action = LopsidedAction;

    fn time_limit(&self) -> Duration {
        Duration::from_secs(10)
    }

    fn initialize(&self, _metadata: &ChallengeMetadata) -> LopsidedState {
        LopsidedState { clicks: 0, hovered: false }
    }

    fn apply(&self, draft: &mut LopsidedState, action: LopsidedAction, _metadata: ActionMetadata) {
        match action {
            LopsidedAction::Hover(_) => draft.hovered = true,
            LopsidedAction::Click(_) => draft.clicks += 1,
        }
    }

    fn is_completed(&self, _state: &LopsidedState) -> bool {
        false
    }

    fn score(&self, state: &LopsidedState) -> Result<Option<u32>, ScoreConfigurationError> {
        let mut score = ScoreKeeper::new();
        if state.clicks == 0 {
            score.add(100, 0.5);
        } else {
            score.add_full(99);
        }
        score.final_score().map(Some)
    }
}

/// In-memory report transport. Connections stay pending until the paired
/// [`Collector`] opens them.
pub struct MemoryTransport {
    gate: Mutex<Option<oneshot::Receiver<bool>>>,
    frames: Mutex<Option<mpsc::UnboundedSender<String>>>,
    inbound: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
    connects: AtomicUsize,
}

pub struct Collector {
    gate: Option<oneshot::Sender<bool>>,
    frames: mpsc::UnboundedReceiver<String>,
    inbound: Option<mpsc::UnboundedSender<String>>,
}

pub fn memory_transport() -> (MemoryTransport, Collector) {
    let (gate_tx, gate_rx) = oneshot::channel();
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

    let transport = MemoryTransport {
        gate: Mutex::new(Some(gate_rx)),
        frames: Mutex::new(Some(frames_tx)),
        inbound: Mutex::new(Some(inbound_rx)),
        connects: AtomicUsize::new(0),
    };
    let collector = Collector {
        gate: Some(gate_tx),
        frames: frames_rx,
        inbound: Some(inbound_tx),
    };
    (transport, collector)
}

impl MemoryTransport {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportTransport for MemoryTransport {
    async fn connect(&self, _url: &str) -> Result<(FrameSink, FrameStream), TelemetryError> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().unwrap().take();
        let accepted = match gate {
            Some(gate) => gate.await.unwrap_or(false),
            None => false,
        };
        let frames = self.frames.lock().unwrap().take().ok_or(TelemetryError::Closed)?;
        let inbound = self.inbound.lock().unwrap().take().ok_or(TelemetryError::Closed)?;
        if !accepted {
            return Err(TelemetryError::Connect("refused".into()));
        }

        let sink = sink::unfold(frames, |frames, frame: String| async move {
            frames.send(frame).map_err(|_| TelemetryError::Closed)?;
            Ok::<_, TelemetryError>(frames)
        });
        let stream = stream::unfold(inbound, |mut inbound| async move {
            inbound
                .recv()
                .await
                .map(|message| (Ok::<_, TelemetryError>(message), inbound))
        });

        Ok((Box::pin(sink), Box::pin(stream)))
    }
}

impl Collector {
    /// Lets the pending connection open.
    pub fn open(&mut self) {
        if let Some(gate) = self.gate.take() {
            let _ = gate.send(true);
        }
    }

    /// Refuses the pending connection.
    pub fn refuse(&mut self) {
        if let Some(gate) = self.gate.take() {
            let _ = gate.send(false);
        }
    }

    /// Ends the inbound stream, as if the collector hung up.
    pub fn hang_up(&mut self) {
        self.inbound.take();
    }

    /// Next frame, parsed. Panics after a generous timeout.
    pub async fn next_frame(&mut self) -> Value {
        let frame = tokio::time::timeout(Duration::from_secs(5), self.frames.recv())
            .await
            .expect("timed out waiting for frame")
            .expect("report stream closed");
        serde_json::from_str(&frame).unwrap()
    }

    /// Every frame the sink received, once the connection is gone.
    pub async fn until_closed(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Some(frame) = self.frames.recv().await {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    /// Frames received so far without waiting.
    pub fn drain_ready(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.frames.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }
}

pub fn kind_of(frame: &Value) -> &'static str {
    if frame.get("challengeMetadata").is_some() {
        "registration"
    } else if frame.get("action").is_some() {
        "action"
    } else if frame.get("status").is_some() {
        "status"
    } else {
        "unknown"
    }
}
