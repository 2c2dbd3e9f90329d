//! Event kinds and transport signals.
//!
//! [`EventType`] names the four lifecycle events a subscriber can listen
//! to. [`Signal`] is what a transport reports to the socket; the socket
//! turns signals into event broadcasts.
//!
//! # Event Types
//!
//! | Variant | Tag | Payload handed to subscribers |
//! |---------|-----|-------------------------------|
//! | `Open` | `onopen` | none |
//! | `Message` | `onmessage` | decoded JSON value |
//! | `Error` | `onerror` | raw transport value |
//! | `Close` | `onclose` | raw transport value |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// EventType
// ============================================================================

/// Lifecycle event kinds a subscriber can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// The transport completed its handshake.
    #[serde(rename = "onopen")]
    Open,
    /// A text frame arrived.
    #[serde(rename = "onmessage")]
    Message,
    /// The transport reported an error.
    #[serde(rename = "onerror")]
    Error,
    /// The transport closed.
    #[serde(rename = "onclose")]
    Close,
}

impl EventType {
    /// All event kinds, in registry order.
    pub const ALL: [Self; 4] = [Self::Open, Self::Message, Self::Error, Self::Close];

    /// Returns the wire tag for this event kind.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "onopen",
            Self::Message => "onmessage",
            Self::Error => "onerror",
            Self::Close => "onclose",
        }
    }

    /// Looks up an event kind by tag.
    ///
    /// Returns `None` for anything other than the four known tags.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "onopen" => Some(Self::Open),
            "onmessage" => Some(Self::Message),
            "onerror" => Some(Self::Error),
            "onclose" => Some(Self::Close),
            _ => None,
        }
    }

    /// Position of this kind inside [`EventType::ALL`].
    #[inline]
    pub(crate) const fn index(&self) -> usize {
        match self {
            Self::Open => 0,
            Self::Message => 1,
            Self::Error => 2,
            Self::Close => 3,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown event tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event type: {0}")]
pub struct UnknownEventType(pub String);

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| UnknownEventType(s.to_string()))
    }
}

// ============================================================================
// Signal
// ============================================================================

/// A raw notification from the transport.
///
/// `None` payloads model signals that arrive without data; the socket
/// drops those without broadcasting.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Handshake completed.
    Open,
    /// Text frame, not yet decoded.
    Message(Option<String>),
    /// Transport error, passed through unchanged.
    Error(Option<Value>),
    /// Transport closed, passed through unchanged.
    Close(Option<Value>),
}

impl Signal {
    /// Event kind this signal is broadcast as.
    #[inline]
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::Open => EventType::Open,
            Self::Message(_) => EventType::Message,
            Self::Error(_) => EventType::Error,
            Self::Close(_) => EventType::Close,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        assert_eq!(EventType::Open.as_str(), "onopen");
        assert_eq!(EventType::Message.as_str(), "onmessage");
        assert_eq!(EventType::Error.as_str(), "onerror");
        assert_eq!(EventType::Close.as_str(), "onclose");
    }

    #[test]
    fn test_from_tag_roundtrips_every_kind() {
        for kind in EventType::ALL {
            assert_eq!(EventType::from_tag(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_from_tag_unknown() {
        assert_eq!(EventType::from_tag("onupgrade"), None);
        assert_eq!(EventType::from_tag("OPEN"), None);
        assert_eq!(EventType::from_tag(""), None);
    }

    #[test]
    fn test_from_str_error() {
        let err = "nope".parse::<EventType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown event type: nope");
    }

    #[test]
    fn test_unknown_event_type_is_std_error() {
        let err: Box<dyn std::error::Error + Send + Sync> =
            Box::new("onupgrade".parse::<EventType>().unwrap_err());
        assert_eq!(err.to_string(), "unknown event type: onupgrade");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, kind) in EventType::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_serde_uses_tags() {
        let json = serde_json::to_string(&EventType::Close).unwrap();
        assert_eq!(json, "\"onclose\"");
        let parsed: EventType = serde_json::from_str("\"onmessage\"").unwrap();
        assert_eq!(parsed, EventType::Message);
    }

    #[test]
    fn test_signal_event_type() {
        assert_eq!(Signal::Open.event_type(), EventType::Open);
        assert_eq!(Signal::Message(None).event_type(), EventType::Message);
        assert_eq!(Signal::Error(None).event_type(), EventType::Error);
        assert_eq!(Signal::Close(None).event_type(), EventType::Close);
    }
}
