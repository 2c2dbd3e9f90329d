//! Outbound message states and the JSON codec.
//!
//! Every outbound payload is encoded as JSON text before it reaches the
//! transport, and every inbound text frame is decoded the same way before
//! it reaches subscribers.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, from_str, to_string};

use crate::error::Result;

// ============================================================================
// MessageState
// ============================================================================

/// What [`Socket::send`](crate::Socket::send) did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageState {
    /// Transmitted immediately.
    Sent,
    /// Queued until the connection opens.
    Cached,
}

impl MessageState {
    /// Returns the lowercase name of this state.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Cached => "cached",
        }
    }
}

impl fmt::Display for MessageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Codec
// ============================================================================

/// Encodes an outbound payload as JSON text.
#[inline]
pub fn encode(message: &Value) -> Result<String> {
    Ok(to_string(message)?)
}

/// Decodes an inbound text frame.
#[inline]
pub fn decode(text: &str) -> Result<Value> {
    Ok(from_str(text)?)
}

// ============================================================================
// Tests
// ============================================================================
