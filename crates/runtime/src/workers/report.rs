//! Connection actor for the report stream.
//!
//! [`ReportWorker`] owns the socket, its outbound queue and its mailbox. The
//! submitter only ever talks to it through [`ReportCommand`]s, so frames are
//! delivered in exactly the order they were produced. Lifecycle:
//!
//! ```text
//! connecting ──open──▶ connected ──close/error──▶ disconnected
//!      └──────────────fail / close────────────────────┘
//! ```

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::telemetry::{
    ConnectionState, FrameSink, FrameStream, OutboundQueue, ReportTransport, StatusBoard,
};

/// Messages accepted by the report worker.
#[derive(Debug)]
pub enum ReportCommand {
    /// One encoded frame.
    Send(String),
    /// Close the connection and stop.
    Close,
}

pub struct ReportWorker {
    url: String,
    transport: Arc<dyn ReportTransport>,
    mailbox: mpsc::UnboundedReceiver<ReportCommand>,
    queue: OutboundQueue,
    status: StatusBoard,
}

enum Opening {
    Open(FrameSink, FrameStream),
    Closed,
}

impl ReportWorker {
    pub(crate) fn new(
        url: String,
        transport: Arc<dyn ReportTransport>,
        mailbox: mpsc::UnboundedReceiver<ReportCommand>,
        status: StatusBoard,
    ) -> Self {
        Self {
            url,
            transport,
            mailbox,
            queue: OutboundQueue::new(),
            status,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        self.status.set_connection(ConnectionState::Connecting);
        info!(target: "runtime::telemetry", url = %self.url, "connecting report stream");

        let (sink, stream) = match self.open().await {
            Opening::Open(sink, stream) => (sink, stream),
            Opening::Closed => {
                self.status.set_connection(ConnectionState::Disconnected);
                return;
            }
        };

        self.status.set_connection(ConnectionState::Connected);
        self.serve(sink, stream).await;
        self.status.set_connection(ConnectionState::Disconnected);

        info!(target: "runtime::telemetry", url = %self.url, "report stream closed");
    }

    /// Connects while queueing whatever arrives in the meantime.
    async fn open(&mut self) -> Opening {
        let transport = Arc::clone(&self.transport);
        let connect = transport.connect(&self.url);
        tokio::pin!(connect);

        loop {
            tokio::select! {
                result = &mut connect => {
                    return match result {
                        Ok((sink, stream)) => Opening::Open(sink, stream),
                        Err(error) => {
                            warn!(
                                target: "runtime::telemetry",
                                error = %error,
                                dropped = self.queue.held(),
                                "report stream unavailable"
                            );
                            Opening::Closed
                        }
                    };
                }
                command = self.mailbox.recv() => match command {
                    Some(ReportCommand::Send(frame)) => {
                        self.queue.push(frame);
                    }
                    Some(ReportCommand::Close) | None => {
                        debug!(target: "runtime::telemetry", "closed before the report stream opened");
                        return Opening::Closed;
                    }
                },
            }
        }
    }

    async fn serve(&mut self, mut sink: FrameSink, mut stream: FrameStream) {
        let held = self.queue.drain();
        debug!(target: "runtime::telemetry", frames = held.len(), "flushing queued frames");
        for frame in held {
            if let Err(error) = sink.feed(frame).await {
                warn!(target: "runtime::telemetry", error = %error, "failed to flush queued frame");
                return;
            }
        }
        if let Err(error) = sink.flush().await {
            warn!(target: "runtime::telemetry", error = %error, "failed to flush queued frames");
            return;
        }

        loop {
            tokio::select! {
                command = self.mailbox.recv() => match command {
                    Some(ReportCommand::Send(frame)) => {
                        if let Err(error) = sink.send(frame).await {
                            warn!(target: "runtime::telemetry", error = %error, "failed to send frame");
                            return;
                        }
                    }
                    Some(ReportCommand::Close) | None => {
                        if let Err(error) = sink.close().await {
                            debug!(target: "runtime::telemetry", error = %error, "error while closing report stream");
                        }
                        return;
                    }
                },
                inbound = stream.next() => match inbound {
                    Some(Ok(message)) => {
                        debug!(target: "runtime::telemetry", bytes = message.len(), "collector message ignored");
                    }
                    Some(Err(error)) => {
                        warn!(target: "runtime::telemetry", error = %error, "report stream error");
                        return;
                    }
                    None => {
                        info!(target: "runtime::telemetry", "collector closed the report stream");
                        return;
                    }
                },
            }
        }
    }
}
