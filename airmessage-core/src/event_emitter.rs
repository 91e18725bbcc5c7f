//! Event Emitter
//!
//! A multi-listener notification primitive. Listeners are plain callbacks
//! invoked synchronously, in registration order, on every [`EventEmitter::notify`].
//! Clones of an emitter share one listener list, so an emitter can be handed
//! out to consumers while the producer keeps notifying through its own copy.
//!
//! For `async` consumers, [`EventEmitter::subscribe`] registers a listener that
//! forwards events into a channel; dropping the [`Subscription`] unregisters it.
//!
//! [`EventEmitter::close`] ends the stream for every clone: listeners are
//! dropped, subscriptions drain and then yield `None`, and later registrations
//! are discarded.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tokio::sync::mpsc;
use tracing::trace;

/// Identifier returned when registering a listener
pub type ListenerId = u64;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    listeners: RwLock<Vec<(ListenerId, Listener<T>)>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl<T> Inner<T> {
    fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match listeners
            .iter()
            .position(|(listener_id, _)| *listener_id == id)
        {
            Some(index) => {
                listeners.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Broadcasts events of type `T` to registered listeners
pub struct EventEmitter<T> {
    inner: Arc<Inner<T>>,
}

impl<T> EventEmitter<T> {
    /// Create an emitter with no listeners
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                listeners: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Register a listener, returning an id for [`EventEmitter::unregister_listener`]
    pub fn register_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let mut listeners = self
            .inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if self.inner.closed.load(Ordering::SeqCst) {
            trace!("Discarding listener {} of a closed emitter", id);
            return id;
        }
        listeners.push((id, Arc::new(listener)));
        trace!("Registered listener {}", id);
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unregister_listener(&self, id: ListenerId) -> bool {
        self.inner.remove(id)
    }

    /// Deliver `event` to every listener registered at the time of the call
    pub fn notify(&self, event: &T) {
        // Snapshot so listeners may (un)register while being notified
        let listeners: Vec<Listener<T>> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    /// Drop every listener and refuse new ones
    ///
    /// Subscriptions receive their buffered events and then `None`.
    pub fn close(&self) {
        let removed = {
            let mut listeners = self
                .inner
                .listeners
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            self.inner.closed.store(true, Ordering::SeqCst);
            std::mem::take(&mut *listeners)
        };
        trace!("Closed emitter, dropped {} listeners", removed.len());
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<T> EventEmitter<T>
where
    T: Clone + Send + 'static,
{
    /// Receive events through a channel instead of a callback
    pub fn subscribe(&self) -> Subscription<T> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.register_listener(move |event: &T| {
            // Receiver gone; the subscription's drop removes this listener
            let _ = sender.send(event.clone());
        });

        Subscription {
            id,
            receiver,
            emitter: Arc::downgrade(&self.inner),
        }
    }
}

impl<T> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Channel-backed listener created by [`EventEmitter::subscribe`]
pub struct Subscription<T> {
    id: ListenerId,
    receiver: mpsc::UnboundedReceiver<T>,
    emitter: Weak<Inner<T>>,
}

impl<T> Subscription<T> {
    /// Listener id backing this subscription
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Wait for the next event
    ///
    /// Returns `None` once every handle to the emitter has been dropped and
    /// all buffered events were received.
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Take a buffered event without waiting
    pub fn try_recv(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.emitter.upgrade() {
            inner.remove(self.id);
        }
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .finish()
    }
}
