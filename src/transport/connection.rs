//! WebSocket connector and I/O loop.
//!
//! [`TokioConnector`] spawns one tokio task per socket. The task performs
//! the handshake, then forwards frames in both directions until either side
//! closes.
//!
//! # Signal Mapping
//!
//! | WebSocket activity | Signal |
//! |--------------------|--------|
//! | Handshake succeeded | `Open` |
//! | Text frame | `Message(Some(text))` |
//! | Close frame | `Close({"code", "reason"})` |
//! | Handshake, read or write error | `Error("<message>")` then `Close` with code 1006 |
//! | Binary, ping, pong | ignored |

// ============================================================================
// Imports
// ============================================================================

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::Signal;

use super::{Connector, SignalSink, Transport};

// ============================================================================
// Constants
// ============================================================================

/// Close code reported when the peer closed without a status.
const NO_STATUS_RECEIVED: u16 = 1005;

/// Close code reported when the connection dropped without a close frame.
const ABNORMAL_CLOSURE: u16 = 1006;

// ============================================================================
// TransportCommand
// ============================================================================

/// Internal commands for the I/O loop.
enum TransportCommand {
    /// Write a text frame.
    Send(String),
    /// Send a close frame and wait for the peer to finish.
    Close,
}

// ============================================================================
// TokioConnector
// ============================================================================

/// Connector that opens real WebSocket connections.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioConnector;

impl TokioConnector {
    /// Creates a connector.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Connector for TokioConnector {
    fn connect(&self, url: &str, sink: SignalSink) -> Result<Box<dyn Transport>> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::connection(format!("no tokio runtime available: {e}")))?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        runtime.spawn(run_event_loop(url.to_string(), command_rx, sink));

        Ok(Box::new(WsTransport { command_tx }))
    }
}

// ============================================================================
// WsTransport
// ============================================================================

/// Handle to a running I/O loop.
struct WsTransport {
    command_tx: mpsc::UnboundedSender<TransportCommand>,
}

impl Transport for WsTransport {
    fn send(&self, frame: String) -> Result<()> {
        self.command_tx
            .send(TransportCommand::Send(frame))
            .map_err(|_| Error::ConnectionClosed)
    }

    fn close(&self) {
        let _ = self.command_tx.send(TransportCommand::Close);
    }
}

// ============================================================================
// Event Loop
// ============================================================================

/// Connects, then pumps frames until the connection ends.
async fn run_event_loop(
    url: String,
    mut command_rx: mpsc::UnboundedReceiver<TransportCommand>,
    sink: SignalSink,
) {
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!(%url, error = %e, "WebSocket connect failed");
            sink.deliver(Signal::Error(Some(Value::String(e.to_string()))));
            sink.deliver(Signal::Close(Some(close_payload(ABNORMAL_CLOSURE, ""))));
            return;
        }
    };

    debug!(%url, "WebSocket connection established");

    let (mut ws_write, mut ws_read) = ws_stream.split();

    if !sink.deliver(Signal::Open) {
        let _ = ws_write.close().await;
        return;
    }

    let mut closing = false;

    let close = loop {
        tokio::select! {
            // Incoming frames from the peer
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        trace!(len = text.len(), "Text frame received");
                        if !sink.deliver(Signal::Message(Some(text.as_str().to_owned()))) {
                            let _ = ws_write.close().await;
                            return;
                        }
                    }

                    Some(Ok(Message::Close(frame))) => {
                        debug!(?frame, "WebSocket closed by remote");
                        break close_frame_payload(frame);
                    }

                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        sink.deliver(Signal::Error(Some(Value::String(e.to_string()))));
                        break close_payload(ABNORMAL_CLOSURE, "");
                    }

                    None => {
                        debug!("WebSocket stream ended");
                        break close_payload(ABNORMAL_CLOSURE, "");
                    }

                    // Ignore Binary, Ping, Pong
                    _ => {}
                }
            }

            // Commands from the socket
            command = command_rx.recv(), if !closing => {
                match command {
                    Some(TransportCommand::Send(frame)) => {
                        trace!(len = frame.len(), "Text frame sent");
                        if let Err(e) = ws_write.send(Message::Text(frame.into())).await {
                            warn!(error = %e, "Failed to send frame");
                            sink.deliver(Signal::Error(Some(Value::String(e.to_string()))));
                            break close_payload(ABNORMAL_CLOSURE, "");
                        }
                    }

                    Some(TransportCommand::Close) => {
                        debug!("Close requested");
                        let _ = ws_write.close().await;
                        closing = true;
                    }

                    None => {
                        debug!("Socket dropped, closing transport");
                        let _ = ws_write.close().await;
                        return;
                    }
                }
            }
        }
    };

    sink.deliver(Signal::Close(Some(close)));

    debug!("Event loop terminated");
}

/// Builds the value handed to close subscribers.
fn close_payload(code: u16, reason: &str) -> Value {
    json!({ "code": code, "reason": reason })
}

fn close_frame_payload(frame: Option<CloseFrame>) -> Value {
    match frame {
        Some(frame) => close_payload(u16::from(frame.code), frame.reason.as_str()),
        None => close_payload(NO_STATUS_RECEIVED, ""),
    }
}

// ============================================================================
// Tests
// ============================================================================
