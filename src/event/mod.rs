//! Event fan-out.
//!
//! One [`EventRegistry`] exists per [`EventType`](crate::EventType). A
//! [`Subscriber`] is a shared callback; clones of it compare equal, which is
//! how unregistration finds it again.

// ============================================================================
// Submodules
// ============================================================================

/// Registry and subscriber types.
pub mod registry;

// ============================================================================
// Re-exports
// ============================================================================

pub use registry::{EventRegistry, Subscriber, SubscriberFn};
