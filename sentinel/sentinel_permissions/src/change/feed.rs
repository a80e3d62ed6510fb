//! Change feeds and subscriptions.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::trace;
use uuid::Uuid;

/// Callback invoked for every change signal. Must not block.
pub type ChangeHandler = Arc<dyn Fn() + Send + Sync + 'static>;

/// A source of "something changed" signals.
pub trait ChangeFeed: Send + Sync {
    /// Register a handler. The handler stays registered until the returned
    /// subscription is unsubscribed or dropped.
    fn subscribe(&self, handler: ChangeHandler) -> Subscription;
}

impl<F: ChangeFeed + ?Sized> ChangeFeed for Arc<F> {
    fn subscribe(&self, handler: ChangeHandler) -> Subscription {
        (**self).subscribe(handler)
    }
}

type Unsubscribe = Box<dyn FnOnce() + Send + 'static>;

/// Handle for a registered change handler.
///
/// Unsubscribing is idempotent and also happens on drop.
pub struct Subscription {
    /// Subscription ID
    id: String,

    /// Releases the handler; taken on first use
    release: Mutex<Option<Unsubscribe>>,
}

impl Subscription {
    /// Create a subscription that runs `release` when unsubscribed.
    pub fn new(id: impl Into<String>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id: id.into(),
            release: Mutex::new(Some(Box::new(release))),
        }
    }

    /// The subscription ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the handler is still registered.
    pub fn is_active(&self) -> bool {
        self.release.lock().is_some()
    }

    /// Remove the handler from its feed. Later calls do nothing.
    pub fn unsubscribe(&self) {
        let release = self.release.lock().take();
        if let Some(release) = release {
            trace!(subscription = %self.id, "Unsubscribing change handler");
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// An in-process change feed.
///
/// Repositories hold one and call [`ChangeNotifier::notify`] after every
/// mutation. Cloning shares the handler table.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    handlers: Arc<DashMap<String, ChangeHandler>>,
}

impl ChangeNotifier {
    /// Create a notifier with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal every subscriber.
    pub fn notify(&self) {
        // Handlers are cloned out so none runs while a shard lock is held.
        let handlers: Vec<ChangeHandler> =
            self.handlers.iter().map(|h| h.value().clone()).collect();
        trace!(subscribers = handlers.len(), "Delivering change signal");
        for handler in handlers {
            handler();
        }
    }

    /// Number of registered handlers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl ChangeFeed for ChangeNotifier {
    fn subscribe(&self, handler: ChangeHandler) -> Subscription {
        let id = format!("sub-{}", Uuid::new_v4());
        self.handlers.insert(id.clone(), handler);

        let handlers: Weak<DashMap<String, ChangeHandler>> = Arc::downgrade(&self.handlers);
        let key = id.clone();
        Subscription::new(id, move || {
            if let Some(handlers) = handlers.upgrade() {
                handlers.remove(&key);
            }
        })
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}
