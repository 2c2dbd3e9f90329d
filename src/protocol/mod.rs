//! Protocol types shared by the socket and its transports.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `event` | [`EventType`] tags and transport [`Signal`]s |
//! | `message` | [`MessageState`] and the JSON codec |

// ============================================================================
// Submodules
// ============================================================================

/// Event kinds and transport signals.
pub mod event;

/// Message states and JSON encoding.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use event::{EventType, Signal, UnknownEventType};
pub use message::{MessageState, decode, encode};
