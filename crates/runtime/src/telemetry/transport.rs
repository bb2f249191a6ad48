//! Connection seam for the report stream.
//!
//! The report worker only needs an ordered sink of text frames and a stream
//! that ends when the collector goes away. [`WebSocketTransport`] provides
//! both over a real socket; tests plug in an in-memory pair.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Sink, SinkExt, Stream, StreamExt, future};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

use crate::api::TelemetryError;

pub type FrameSink = Pin<Box<dyn Sink<String, Error = TelemetryError> + Send>>;
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, TelemetryError>> + Send>>;

/// Opens report connections.
#[async_trait]
pub trait ReportTransport: Send + Sync {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream), TelemetryError>;
}

/// WebSocket transport; each frame is one text message.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebSocketTransport;

#[async_trait]
impl ReportTransport for WebSocketTransport {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream), TelemetryError> {
        let (socket, response) = connect_async(url)
            .await
            .map_err(|error| TelemetryError::Connect(error.to_string()))?;
        debug!(
            target: "runtime::telemetry",
            url,
            status = response.status().as_u16(),
            "report socket opened"
        );

        let (write, read) = socket.split();

        let sink = write
            .sink_map_err(TelemetryError::Socket)
            .with(|frame: String| future::ready(Ok::<_, TelemetryError>(Message::text(frame))));

        let stream = read
            .take_while(|message| future::ready(!matches!(message, Ok(Message::Close(_)))))
            .filter_map(|message| {
                future::ready(match message {
                    Ok(Message::Text(text)) => Some(Ok(text.to_string())),
                    Ok(_) => None,
                    Err(error) => Some(Err(TelemetryError::Socket(error))),
                })
            });

        Ok((Box::pin(sink), Box::pin(stream)))
    }
}
