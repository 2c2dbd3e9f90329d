//! Socket configuration.
//!
//! The only option is the target `url`. It is type-checked, not parsed:
//! an unreachable or malformed url surfaces later as an error and close
//! signal from the transport.
//!
//! # Example
//!
//! ```
//! use cached_socket::SocketOptions;
//! use serde_json::json;
//!
//! let options = SocketOptions::from_value(&json!({ "url": "ws://127.0.0.1:9001" }))?;
//! assert_eq!(options.url, "ws://127.0.0.1:9001");
//!
//! assert!(SocketOptions::from_value(&json!({ "url": 9001 })).is_err());
//! # Ok::<(), cached_socket::Error>(())
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// SocketOptions
// ============================================================================

/// Options for opening a [`Socket`](crate::Socket).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketOptions {
    /// WebSocket url to connect to.
    pub url: String,
}

impl SocketOptions {
    /// Creates options for `url`.
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Reads options from an untyped configuration object.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUrl`] if `url` is missing or not a string.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value.get("url") {
            Some(Value::String(url)) => Ok(Self::new(url.as_str())),
            _ => Err(Error::invalid_url("Passed url is not a string")),
        }
    }
}

impl TryFrom<&Value> for SocketOptions {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl From<&str> for SocketOptions {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for SocketOptions {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

// ============================================================================
// Tests
// ============================================================================
