//! Builder pattern for socket configuration.
//!
//! # Example
//!
//! ```no_run
//! use cached_socket::Socket;
//!
//! # async fn example() -> cached_socket::Result<()> {
//! let socket = Socket::builder()
//!     .url("ws://127.0.0.1:9001")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::transport::{Connector, TokioConnector};

use super::core::Socket;
use super::options::SocketOptions;

// ============================================================================
// SocketBuilder
// ============================================================================

/// Builder for configuring a [`Socket`].
///
/// Use [`Socket::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct SocketBuilder {
    /// Target url.
    url: Option<String>,
    /// Connector override; defaults to [`TokioConnector`].
    connector: Option<Arc<dyn Connector>>,
}

impl SocketBuilder {
    /// Creates a builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the url to connect to.
    #[inline]
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Takes the url from existing options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: SocketOptions) -> Self {
        self.url = Some(options.url);
        self
    }

    /// Replaces the connector used to open the transport.
    #[inline]
    #[must_use]
    pub fn connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Opens the socket.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if no url was set
    /// - Any error returned by the connector
    pub fn build(self) -> Result<Socket> {
        let url = self.url.ok_or_else(|| {
            Error::invalid_url("url is required. Use .url() to set it.")
        })?;

        match self.connector {
            Some(connector) => Socket::open(SocketOptions::new(url), connector.as_ref()),
            None => Socket::open(SocketOptions::new(url), &TokioConnector::new()),
        }
    }
}

impl fmt::Debug for SocketBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketBuilder")
            .field("url", &self.url)
            .field("custom_connector", &self.connector.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::transport::MemoryConnector;

    #[test]
    fn test_build_without_url() {
        let err = SocketBuilder::new()
            .connector(MemoryConnector::new())
            .build()
            .unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_build_with_memory_connector() {
        let connector = MemoryConnector::new();
        let handle = connector.handle();

        let socket = SocketBuilder::new()
            .url("ws://x")
            .connector(connector)
            .build()
            .unwrap();

        assert_eq!(socket.url(), "ws://x");
        assert_eq!(handle.url().as_deref(), Some("ws://x"));
    }

    #[test]
    fn test_options_sets_url() {
        let builder = SocketBuilder::new().options(SocketOptions::new("ws://y"));
        assert_eq!(builder.url.as_deref(), Some("ws://y"));
    }

    #[test]
    fn test_default_connector_needs_runtime() {
        let err = SocketBuilder::new().url("ws://x").build().unwrap_err();
        assert!(err.is_connection_error());
    }
}
