//! In-memory transport for tests.
//!
//! [`MemoryConnector`] hands out transports that record every frame they
//! are asked to send. The paired [`MemoryHandle`] injects signals as if a
//! server had opened, written to, failed or closed the connection.
//!
//! # Example
//!
//! ```
//! use cached_socket::{MemoryConnector, MessageState, Socket, SocketOptions};
//! use serde_json::json;
//!
//! let connector = MemoryConnector::new();
//! let handle = connector.handle();
//! let socket = Socket::with_connector(SocketOptions::new("ws://x"), connector)?;
//!
//! assert_eq!(socket.send(json!({ "name": "a" })), MessageState::Cached);
//! handle.open();
//! assert_eq!(handle.sent(), vec![r#"{"name":"a"}"#.to_string()]);
//! # Ok::<(), cached_socket::Error>(())
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::protocol::Signal;

use super::{Connector, SignalSink, Transport};

// ============================================================================
// Shared State
// ============================================================================

#[derive(Default)]
struct MemoryState {
    /// Url passed to the last `connect`.
    url: Option<String>,
    /// Sink of the connected socket.
    sink: Option<SignalSink>,
    /// Frames passed to `Transport::send`, in order.
    sent: Vec<String>,
    /// Set once `Transport::close` was called.
    closed: bool,
    /// When set, `connect` fails with this message.
    connect_error: Option<String>,
}

// ============================================================================
// MemoryConnector
// ============================================================================

/// Connector whose transports live entirely in memory.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnector {
    /// Creates a connector that accepts every connection.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connector whose `connect` always fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        let connector = Self::default();
        connector.state.lock().connect_error = Some(message.into());
        connector
    }

    /// Returns a handle for driving the connected transport.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, url: &str, sink: SignalSink) -> Result<Box<dyn Transport>> {
        let mut state = self.state.lock();
        if let Some(message) = &state.connect_error {
            return Err(Error::connection(message.clone()));
        }

        state.url = Some(url.to_string());
        state.sink = Some(sink);
        state.sent.clear();
        state.closed = false;

        Ok(Box::new(MemoryTransport {
            state: Arc::clone(&self.state),
        }))
    }
}

// ============================================================================
// MemoryTransport
// ============================================================================

struct MemoryTransport {
    state: Arc<Mutex<MemoryState>>,
}

impl Transport for MemoryTransport {
    fn send(&self, frame: String) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(Error::ConnectionClosed);
        }
        state.sent.push(frame);
        Ok(())
    }

    fn close(&self) {
        self.state.lock().closed = true;
    }
}

// ============================================================================
// MemoryHandle
// ============================================================================

/// Test-side controls for a [`MemoryConnector`].
#[derive(Clone)]
pub struct MemoryHandle {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryHandle {
    /// Delivers a raw signal.
    ///
    /// Returns `false` if nothing is connected or the socket was dropped.
    pub fn signal(&self, signal: Signal) -> bool {
        // Deliver outside the lock: the socket calls back into `send`.
        let sink = self.state.lock().sink.clone();
        sink.is_some_and(|sink| sink.deliver(signal))
    }

    /// Completes the handshake.
    pub fn open(&self) -> bool {
        self.signal(Signal::Open)
    }

    /// Delivers a text frame.
    pub fn message(&self, text: impl Into<String>) -> bool {
        self.signal(Signal::Message(Some(text.into())))
    }

    /// Reports an error.
    pub fn error(&self, value: impl Into<Value>) -> bool {
        self.signal(Signal::Error(Some(value.into())))
    }

    /// Reports that the connection closed.
    pub fn close(&self, value: impl Into<Value>) -> bool {
        self.state.lock().closed = true;
        self.signal(Signal::Close(Some(value.into())))
    }

    /// Frames transmitted so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.state.lock().sent.clone()
    }

    /// Url the socket connected to.
    #[must_use]
    pub fn url(&self) -> Option<String> {
        self.state.lock().url.clone()
    }

    /// Returns `true` once the transport was closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Returns `true` while a live socket is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.state
            .lock()
            .sink
            .as_ref()
            .is_some_and(SignalSink::is_attached)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_without_connection() {
        let connector = MemoryConnector::new();
        assert!(!connector.handle().open());
    }

    #[test]
    fn test_failing_connector() {
        let connector = MemoryConnector::failing("refused");
        let result = connector.connect("ws://x", SignalSink::new(std::sync::Weak::<Null>::new()));
        assert!(matches!(result, Err(Error::Connection { .. })));
        assert_eq!(connector.handle().url(), None);
    }

    #[test]
    fn test_transport_records_frames() {
        let connector = MemoryConnector::new();
        let handle = connector.handle();
        let transport = connector
            .connect("ws://x", SignalSink::new(std::sync::Weak::<Null>::new()))
            .unwrap();

        transport.send("1".into()).unwrap();
        transport.send("2".into()).unwrap();

        assert_eq!(handle.sent(), vec!["1".to_string(), "2".to_string()]);
        assert_eq!(handle.url().as_deref(), Some("ws://x"));
        assert!(!handle.is_attached());
    }

    #[test]
    fn test_send_after_close_fails() {
        let connector = MemoryConnector::new();
        let handle = connector.handle();
        let transport = connector
            .connect("ws://x", SignalSink::new(std::sync::Weak::<Null>::new()))
            .unwrap();

        transport.close();
        assert!(handle.is_closed());
        assert!(matches!(
            transport.send("x".into()),
            Err(Error::ConnectionClosed)
        ));
    }

    struct Null;

    impl super::super::SignalHandler for Null {
        fn handle_signal(&self, _signal: Signal) {}
    }
}
