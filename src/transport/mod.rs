//! Transport layer.
//!
//! The socket never talks to a network API directly. It asks a
//! [`Connector`] to open a [`Transport`] and hands it a [`SignalSink`]; the
//! transport reports open/message/error/close through that sink and accepts
//! encoded frames through [`Transport::send`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   send(frame) / close()    ┌──────────────────┐
//! │    Socket    │───────────────────────────►│    Transport     │
//! │              │                            │  (tokio task or  │
//! │  registries  │◄───────────────────────────│   test double)   │
//! └──────────────┘   SignalSink::deliver()    └──────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | tokio-tungstenite connector and I/O loop |
//! | `memory` | In-memory connector for tests |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connector backed by tokio-tungstenite.
pub mod connection;

/// In-memory connector that records frames and injects signals.
pub mod memory;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Weak;

use crate::error::Result;
use crate::protocol::Signal;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::TokioConnector;
pub use memory::{MemoryConnector, MemoryHandle};

// ============================================================================
// Traits
// ============================================================================

/// An open (or opening) bidirectional connection.
///
/// Both methods must return without waiting on the network.
pub trait Transport: Send + Sync {
    /// Queues an encoded text frame for transmission.
    ///
    /// The socket calls this without holding any of its locks, so an
    /// implementation may deliver signals on its [`SignalSink`] before
    /// returning (e.g. a test double that echoes every frame back).
    ///
    /// # Errors
    ///
    /// [`Error::ConnectionClosed`](crate::Error::ConnectionClosed) if the
    /// transport no longer accepts frames.
    fn send(&self, frame: String) -> Result<()>;

    /// Starts closing the connection.
    ///
    /// Completion is reported through [`Signal::Close`].
    fn close(&self);
}

/// Opens transports.
///
/// `connect` must not deliver signals on `sink` before it returns; signals
/// belong to the transport's own event flow.
pub trait Connector: Send + Sync {
    /// Starts connecting to `url` and returns the transport handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection attempt cannot be started at all.
    /// Failures of the attempt itself are reported as signals.
    fn connect(&self, url: &str, sink: SignalSink) -> Result<Box<dyn Transport>>;
}

/// Receiver side of a [`SignalSink`].
pub(crate) trait SignalHandler: Send + Sync {
    fn handle_signal(&self, signal: Signal);
}

// ============================================================================
// SignalSink
// ============================================================================

/// Channel from a transport back to its socket.
///
/// Holds only a weak reference, so a transport never keeps its socket
/// alive. Signals must be delivered one at a time.
#[derive(Clone)]
pub struct SignalSink {
    handler: Weak<dyn SignalHandler>,
}

impl SignalSink {
    pub(crate) fn new(handler: Weak<dyn SignalHandler>) -> Self {
        Self { handler }
    }

    /// Delivers a signal to the socket.
    ///
    /// Returns `false` if the socket has been dropped.
    pub fn deliver(&self, signal: Signal) -> bool {
        match self.handler.upgrade() {
            Some(handler) => {
                handler.handle_signal(signal);
                true
            }
            None => false,
        }
    }

    /// Returns `true` while the socket is alive.
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.handler.strong_count() > 0
    }
}

impl fmt::Debug for SignalSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalSink")
            .field("attached", &self.is_attached())
            .finish()
    }
}
