//! cached-socket - WebSocket client that never loses early messages.
//!
//! A [`Socket`] wraps one bidirectional connection. Messages sent before
//! the handshake completes are cached and flushed, in order, the moment the
//! connection opens. Consumers subscribe to the four lifecycle events
//! (open, message, error, close) without touching the transport.
//!
//! # Architecture
//!
//! ```text
//! send() ──► ready? ──yes──► encode ──► Transport
//!              │
//!              no ──► queue ──(open signal)──► encode ──► Transport
//!
//! Transport ──► Signal ──► decode (message only) ──► EventRegistry ──► subscribers
//! ```
//!
//! Key design principles:
//!
//! - The transport is injected through a [`Connector`]; the default is
//!   [`TokioConnector`] on tokio-tungstenite
//! - Readiness is one-way: no reconnection, no re-queuing
//! - Broadcast isolates panicking subscribers
//!
//! # Quick Start
//!
//! ```no_run
//! use cached_socket::{EventType, Result, Socket, SocketOptions, Subscriber};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let socket = Socket::new(SocketOptions::new("ws://127.0.0.1:9001"))?;
//!
//!     socket.register_callback(
//!         EventType::Message,
//!         &Subscriber::new(|_, payload| println!("server said {payload:?}")),
//!     );
//!
//!     // Returns MessageState::Cached until the handshake completes.
//!     socket.send(json!({ "name": "a" }));
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`socket`] | [`Socket`], [`SocketOptions`], [`SocketBuilder`] |
//! | [`event`] | [`EventRegistry`], [`Subscriber`] |
//! | [`protocol`] | [`EventType`], [`MessageState`], [`Signal`], JSON codec |
//! | [`transport`] | [`Connector`], [`Transport`], tokio and in-memory connectors |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | [`SocketId`] |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
pub mod error;

/// Per-event subscriber registries.
pub mod event;

/// Type-safe identifiers.
pub mod identifiers;

/// Event tags, message states and the JSON codec.
pub mod protocol;

/// The socket wrapper.
pub mod socket;

/// Transport seam and connectors.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Event types
pub use event::{EventRegistry, Subscriber};

// Identifier types
pub use identifiers::SocketId;

// Protocol types
pub use protocol::{EventType, MessageState, Signal};

// Socket types
pub use socket::{Socket, SocketBuilder, SocketOptions};

// Transport types
pub use transport::{
    Connector, MemoryConnector, MemoryHandle, SignalSink, TokioConnector, Transport,
};
