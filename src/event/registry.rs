//! Ordered multi-subscriber registry for one event kind.
//!
//! A registry notifies its subscribers in registration order. The same
//! subscriber may be registered more than once and is then invoked once per
//! registration.
//!
//! # Broadcast Semantics
//!
//! - Subscribers are snapshotted before the first one runs, so a subscriber
//!   may register or unregister on the same registry while being notified.
//!   Such changes take effect at the next broadcast.
//! - A panicking subscriber is caught and logged; the remaining subscribers
//!   still run.
//! - Each subscriber receives the registry itself as its first argument.

// ============================================================================
// Imports
// ============================================================================

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{error, trace};

use crate::protocol::EventType;

// ============================================================================
// Types
// ============================================================================

/// Callback signature shared by every event kind.
///
/// The payload is `None` for [`EventType::Open`] and `Some` otherwise.
pub type SubscriberFn = dyn Fn(&EventRegistry, Option<&Value>) + Send + Sync;

// ============================================================================
// Subscriber
// ============================================================================

/// A registered callback.
///
/// Cloning a `Subscriber` yields the same subscriber: identity is the
/// shared closure, which is what [`EventRegistry::unregister`] matches on.
///
/// # Example
///
/// ```
/// use cached_socket::Subscriber;
///
/// let subscriber = Subscriber::new(|registry, payload| {
///     println!("{} -> {:?}", registry.event_type(), payload);
/// });
/// assert!(subscriber.same_as(&subscriber.clone()));
/// ```
#[derive(Clone)]
pub struct Subscriber(Arc<SubscriberFn>);

impl Subscriber {
    /// Wraps a closure as a subscriber.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&EventRegistry, Option<&Value>) + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    /// Returns `true` if both handles refer to the same subscriber.
    #[inline]
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    fn call(&self, registry: &EventRegistry, payload: Option<&Value>) {
        (self.0)(registry, payload);
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Subscriber")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

// ============================================================================
// EventRegistry
// ============================================================================

/// Subscribers for a single [`EventType`].
pub struct EventRegistry {
    /// Event kind this registry serves.
    event_type: EventType,
    /// Subscribers in registration order.
    subscribers: Mutex<Vec<Subscriber>>,
}

impl EventRegistry {
    /// Creates an empty registry for `event_type`.
    #[must_use]
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Event kind this registry serves.
    #[inline]
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Appends a subscriber.
    ///
    /// Always returns `true`: a [`Subscriber`] is callable by construction.
    pub fn register(&self, subscriber: &Subscriber) -> bool {
        self.subscribers.lock().push(subscriber.clone());
        trace!(event = %self.event_type, "Subscriber registered");
        true
    }

    /// Removes the first registration of `subscriber`.
    ///
    /// Returns `false` if it was not registered.
    pub fn unregister(&self, subscriber: &Subscriber) -> bool {
        let mut subscribers = self.subscribers.lock();
        let Some(position) = subscribers.iter().position(|s| s.same_as(subscriber)) else {
            return false;
        };
        subscribers.remove(position);
        trace!(event = %self.event_type, position, "Subscriber unregistered");
        true
    }

    /// Invokes every subscriber in registration order.
    ///
    /// Returns `true` if at least one subscriber was registered.
    pub fn broadcast(&self, payload: Option<&Value>) -> bool {
        let snapshot = self.subscribers.lock().clone();
        if snapshot.is_empty() {
            return false;
        }

        for (position, subscriber) in snapshot.iter().enumerate() {
            let outcome = catch_unwind(AssertUnwindSafe(|| subscriber.call(self, payload)));
            if let Err(panic) = outcome {
                error!(
                    event = %self.event_type,
                    position,
                    panic = panic_message(&*panic),
                    "Subscriber panicked"
                );
            }
        }

        trace!(event = %self.event_type, count = snapshot.len(), "Broadcast completed");
        true
    }

    /// Returns `true` if `subscriber` is registered at least once.
    #[must_use]
    pub fn contains(&self, subscriber: &Subscriber) -> bool {
        self.subscribers.lock().iter().any(|s| s.same_as(subscriber))
    }

    /// Number of registrations (duplicates counted).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Returns `true` if nothing is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().is_empty()
    }

    /// Removes every subscriber.
    pub fn clear(&self) {
        self.subscribers.lock().clear();
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("event_type", &self.event_type)
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Best-effort text of a panic payload.
fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic>"
    }
}

// ============================================================================
// Tests
// ============================================================================
