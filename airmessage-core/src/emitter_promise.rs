//! Emitter/Promise Tuple
//!
//! Pairs a stream of progress events with a single eventual result, for
//! operations such as attachment downloads that report progress before
//! completing.
//!
//! The producer half is consumed by [`EmitterPromiseProducer::resolve`] and
//! [`EmitterPromiseProducer::reject`], and settling (or dropping) it closes the
//! emitter: subscriptions drain their buffered events and then end. Events are
//! delivered synchronously to the listeners registered when they are emitted;
//! nothing is replayed to late listeners.
//!
//! ```rust
//! use airmessage_core::emitter_promise::EmitterPromiseTuple;
//!
//! # tokio_test::block_on(async {
//! let (tuple, producer) = EmitterPromiseTuple::<u8, Vec<u8>, String>::new();
//! let mut progress = tuple.emitter.subscribe();
//!
//! producer.emit(&50);
//! producer.emit(&100);
//! producer.resolve(vec![1, 2, 3]);
//!
//! assert_eq!(progress.recv().await, Some(50));
//! assert_eq!(progress.recv().await, Some(100));
//! assert_eq!(progress.recv().await, None);
//! assert_eq!(tuple.promise.await, Ok(vec![1, 2, 3]));
//! # });
//! ```

use std::fmt;

use crate::deferred::{Deferred, Promise, Settler};
use crate::event_emitter::EventEmitter;
use crate::CoreError;

/// Consumer side: an event stream and an eventual result
pub struct EmitterPromiseTuple<E, P, R = CoreError> {
    /// Events emitted while the operation runs
    pub emitter: EventEmitter<E>,
    /// The operation's result
    pub promise: Promise<P, R>,
}

impl<E, P, R> EmitterPromiseTuple<E, P, R> {
    /// Create a linked consumer tuple and producer
    pub fn new() -> (Self, EmitterPromiseProducer<E, P, R>) {
        let emitter = EventEmitter::new();
        let (settler, promise) = Deferred::new().split();

        (
            Self {
                emitter: emitter.clone(),
                promise,
            },
            EmitterPromiseProducer { emitter, settler },
        )
    }
}

impl<E, P, R> fmt::Debug for EmitterPromiseTuple<E, P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmitterPromiseTuple")
            .field("emitter", &self.emitter)
            .finish_non_exhaustive()
    }
}

/// Producer side of an [`EmitterPromiseTuple`]
///
/// Dropping the producer without settling abandons the promise. Either way
/// the event stream is closed once the producer is gone.
pub struct EmitterPromiseProducer<E, P, R = CoreError> {
    emitter: EventEmitter<E>,
    settler: Settler<P, R>,
}

impl<E, P, R> EmitterPromiseProducer<E, P, R> {
    /// Notify listeners of an intermediate event
    pub fn emit(&self, event: &E) {
        self.emitter.notify(event);
    }

    /// Complete the operation successfully, closing the event stream
    pub fn resolve(self, value: P) {
        self.settler.resolve(value);
    }

    /// Fail the operation, closing the event stream
    pub fn reject(self, reason: R) {
        self.settler.reject(reason);
    }
}

impl<E, P, R> Drop for EmitterPromiseProducer<E, P, R> {
    fn drop(&mut self) {
        self.emitter.close();
    }
}

impl<E, P, R> fmt::Debug for EmitterPromiseProducer<E, P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmitterPromiseProducer")
            .field("settler", &self.settler)
            .finish_non_exhaustive()
    }
}
