//! The socket wrapper.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | [`Socket`] and signal handling |
//! | `options` | [`SocketOptions`] |
//! | `builder` | [`SocketBuilder`] |

// ============================================================================
// Submodules
// ============================================================================

/// Builder for configuring a socket.
pub mod builder;

/// Socket implementation.
pub mod core;

/// Socket configuration.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::SocketBuilder;
pub use self::core::Socket;
pub use options::SocketOptions;
