//! Socket core implementation.
//!
//! A [`Socket`] owns one transport, an outbound queue and one
//! [`EventRegistry`] per [`EventType`].
//!
//! # Lifecycle
//!
//! ```text
//! NOT_READY ──(open signal: flush queue, set ready, notify)──► READY
//! ```
//!
//! Readiness never goes back to false. After a close signal `send` still
//! reports [`MessageState::Sent`]; the transport discards the frame.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::event::{EventRegistry, Subscriber};
use crate::identifiers::SocketId;
use crate::protocol::{EventType, MessageState, Signal, decode, encode};
use crate::transport::{Connector, SignalHandler, SignalSink, TokioConnector, Transport};

use super::builder::SocketBuilder;
use super::options::SocketOptions;

// ============================================================================
// ConnectionState
// ============================================================================

/// Mutable connection state, guarded by one lock.
///
/// The lock is never held while calling into the transport: a transport may
/// deliver signals from inside `send`, and subscribers may call back into
/// the socket.
struct ConnectionState {
    /// Set once the open signal has flushed the queue.
    ready: bool,
    /// Set while the open signal is flushing the queue.
    opening: bool,
    /// Messages sent before ready, unencoded, oldest first.
    queue: VecDeque<Value>,
    /// Transport handle; `None` only while the connector runs.
    transport: Option<Arc<dyn Transport>>,
}

/// Encodes and hands a message to the transport.
fn transmit(socket_id: SocketId, transport: Option<&Arc<dyn Transport>>, message: &Value) {
    let Some(transport) = transport else {
        warn!(%socket_id, "No transport, message dropped");
        return;
    };

    let frame = match encode(message) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(%socket_id, error = %e, "Failed to encode message");
            return;
        }
    };

    if let Err(e) = transport.send(frame) {
        warn!(%socket_id, error = %e, "Failed to transmit message");
    }
}

// ============================================================================
// Inner
// ============================================================================

/// Shared socket internals.
struct Inner {
    id: SocketId,
    url: String,
    state: Mutex<ConnectionState>,
    /// Indexed by [`EventType::index`].
    registries: [EventRegistry; 4],
}

impl Inner {
    fn new(url: String) -> Self {
        Self {
            id: SocketId::generate(),
            url,
            state: Mutex::new(ConnectionState {
                ready: false,
                opening: false,
                queue: VecDeque::new(),
                transport: None,
            }),
            registries: EventType::ALL.map(EventRegistry::new),
        }
    }

    #[inline]
    fn registry(&self, event_type: EventType) -> &EventRegistry {
        &self.registries[event_type.index()]
    }

    fn handle_open(&self) {
        {
            let mut state = self.state.lock();
            if state.ready || state.opening {
                warn!(socket_id = %self.id, "Duplicate open signal ignored");
                return;
            }
            state.opening = true;
        }

        let mut flushed = 0;

        // Messages cached while flushing (e.g. by a subscriber reacting to
        // an echoed frame) are drained in later rounds, still before ready.
        loop {
            let (pending, transport) = {
                let mut state = self.state.lock();
                if state.queue.is_empty() {
                    state.opening = false;
                    state.ready = true;
                    break;
                }
                (std::mem::take(&mut state.queue), state.transport.clone())
            };

            for message in &pending {
                transmit(self.id, transport.as_ref(), message);
            }
            flushed += pending.len();
        }

        debug!(socket_id = %self.id, flushed, "Socket open");

        self.registry(EventType::Open).broadcast(None);
    }

    fn handle_message(&self, data: Option<String>) {
        let Some(text) = data else {
            trace!(socket_id = %self.id, "Message signal without data dropped");
            return;
        };

        match decode(&text) {
            Ok(value) => {
                self.registry(EventType::Message).broadcast(Some(&value));
            }
            Err(e) => {
                debug!(socket_id = %self.id, error = %e, "Malformed message dropped");
            }
        }
    }

    fn handle_passthrough(&self, event_type: EventType, value: Option<Value>) {
        match value {
            Some(value) => {
                debug!(socket_id = %self.id, event = %event_type, %value, "Transport event");
                self.registry(event_type).broadcast(Some(&value));
            }
            None => {
                trace!(socket_id = %self.id, event = %event_type, "Signal without value dropped");
            }
        }
    }
}

impl SignalHandler for Inner {
    fn handle_signal(&self, signal: Signal) {
        match signal {
            Signal::Open => self.handle_open(),
            Signal::Message(data) => self.handle_message(data),
            Signal::Error(value) => self.handle_passthrough(EventType::Error, value),
            Signal::Close(value) => self.handle_passthrough(EventType::Close, value),
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(transport) = self.state.get_mut().transport.take() {
            transport.close();
        }
    }
}

// ============================================================================
// Socket
// ============================================================================

/// WebSocket client that caches messages until the connection opens.
///
/// Cloning yields another handle to the same connection. Dropping the last
/// handle closes the transport.
///
/// # Example
///
/// ```no_run
/// use cached_socket::{EventType, Socket, SocketOptions, Subscriber};
/// use serde_json::json;
///
/// # async fn example() -> cached_socket::Result<()> {
/// let socket = Socket::new(SocketOptions::new("ws://127.0.0.1:9001"))?;
///
/// socket.register_callback(
///     EventType::Message,
///     &Subscriber::new(|_, payload| println!("received {payload:?}")),
/// );
///
/// // Cached now, flushed as soon as the handshake completes.
/// socket.send(json!({ "name": "a" }));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Socket {
    inner: Arc<Inner>,
}

// ============================================================================
// Socket - Construction
// ============================================================================

impl Socket {
    /// Opens a socket using the tokio-tungstenite connector.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// [`Error::Connection`](crate::Error::Connection) if no runtime is
    /// available.
    pub fn new(options: SocketOptions) -> Result<Self> {
        Self::open(options, &TokioConnector::new())
    }

    /// Opens a socket using `connector`.
    ///
    /// # Errors
    ///
    /// Any error returned by the connector.
    pub fn with_connector<C: Connector>(options: SocketOptions, connector: C) -> Result<Self> {
        Self::open(options, &connector)
    }

    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> SocketBuilder {
        SocketBuilder::new()
    }

    pub(crate) fn open(options: SocketOptions, connector: &dyn Connector) -> Result<Self> {
        let inner = Arc::new(Inner::new(options.url));

        let handler: Arc<dyn SignalHandler> = Arc::clone(&inner) as Arc<dyn SignalHandler>;
        let sink = SignalSink::new(Arc::downgrade(&handler));
        drop(handler);

        {
            // Held across connect so no signal is handled before the
            // transport is stored.
            let mut state = inner.state.lock();
            state.transport = Some(Arc::from(connector.connect(&inner.url, sink)?));
        }

        debug!(socket_id = %inner.id, url = %inner.url, "Socket created");

        Ok(Self { inner })
    }
}

// ============================================================================
// Socket - Messaging
// ============================================================================

impl Socket {
    /// Sends a message, or caches it until the connection opens.
    ///
    /// Cached messages are stored unencoded and flushed in order before
    /// open subscribers run.
    pub fn send(&self, message: Value) -> MessageState {
        let transport = {
            let mut state = self.inner.state.lock();
            if !state.ready {
                state.queue.push_back(message);
                trace!(socket_id = %self.inner.id, queued = state.queue.len(), "Message cached");
                return MessageState::Cached;
            }
            state.transport.clone()
        };

        transmit(self.inner.id, transport.as_ref(), &message);
        trace!(socket_id = %self.inner.id, "Message sent");
        MessageState::Sent
    }

    /// Converts `message` to JSON, then behaves like [`Socket::send`].
    ///
    /// # Errors
    ///
    /// [`Error::Json`](crate::Error::Json) if `message` cannot be
    /// represented as JSON. Nothing is queued in that case.
    pub fn send_serialize<T: Serialize + ?Sized>(&self, message: &T) -> Result<MessageState> {
        let value = serde_json::to_value(message)?;
        Ok(self.send(value))
    }

    /// Asks the transport to close.
    ///
    /// Close subscribers are notified when the transport reports the close.
    pub fn close(&self) {
        let transport = self.inner.state.lock().transport.clone();
        if let Some(transport) = transport {
            debug!(socket_id = %self.inner.id, "Closing socket");
            transport.close();
        }
    }
}

// ============================================================================
// Socket - Callbacks
// ============================================================================

impl Socket {
    /// Registers `subscriber` for `event_type`.
    ///
    /// Returns `true` once added.
    pub fn register_callback(&self, event_type: EventType, subscriber: &Subscriber) -> bool {
        self.inner.registry(event_type).register(subscriber)
    }

    /// Removes the first registration of `subscriber` for `event_type`.
    ///
    /// Returns `false` if it was not registered.
    pub fn unregister_callback(&self, event_type: EventType, subscriber: &Subscriber) -> bool {
        self.inner.registry(event_type).unregister(subscriber)
    }

    /// Registers by event tag (`"onopen"`, `"onmessage"`, `"onerror"`,
    /// `"onclose"`).
    ///
    /// Returns `false` for an unknown tag without registering anything.
    pub fn register_callback_tag(&self, tag: &str, subscriber: &Subscriber) -> bool {
        match EventType::from_tag(tag) {
            Some(event_type) => self.register_callback(event_type, subscriber),
            None => {
                debug!(socket_id = %self.inner.id, tag, "Unknown event type");
                false
            }
        }
    }

    /// Unregisters by event tag.
    ///
    /// Returns `false` for an unknown tag.
    pub fn unregister_callback_tag(&self, tag: &str, subscriber: &Subscriber) -> bool {
        match EventType::from_tag(tag) {
            Some(event_type) => self.unregister_callback(event_type, subscriber),
            None => {
                debug!(socket_id = %self.inner.id, tag, "Unknown event type");
                false
            }
        }
    }

    /// Number of registrations for `event_type`.
    #[inline]
    #[must_use]
    pub fn subscriber_count(&self, event_type: EventType) -> usize {
        self.inner.registry(event_type).len()
    }
}

// ============================================================================
// Socket - Accessors
// ============================================================================

impl Socket {
    /// Unique id of this socket.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SocketId {
        self.inner.id
    }

    /// Url this socket connects to.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Returns `true` once the open signal has been handled.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.state.lock().ready
    }

    /// Number of cached messages awaiting the open signal.
    #[inline]
    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.inner.state.lock().queue.len()
    }
}

impl fmt::Debug for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Socket")
            .field("id", &self.inner.id)
            .field("url", &self.inner.url)
            .field("ready", &state.ready)
            .field("queued", &state.queue.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
