//! Deferred Promises
//!
//! A [`Deferred`] is a one-shot channel split into a [`Settler`] (the
//! producer side, cloneable, callable from any context) and a [`Promise`]
//! (the consumer side, awaited once). It is the bridge between
//! callback-style APIs and `async` code.
//!
//! ## Settlement
//!
//! - `resolve(value)` fulfils the promise, `reject(reason)` rejects it.
//! - Only the first settlement has effect; later calls return `false`.
//! - There is no built-in timeout: while any settler is alive and unsettled,
//!   awaiting the promise pends forever. Use [`Settler::timeout`] or
//!   [`promise_timeout`] when a deadline is needed.
//! - If every settler is dropped without settling, the promise completes with
//!   [`DeferredError::Abandoned`].
//!
//! ## Example
//!
//! ```rust
//! use airmessage_core::deferred::{Deferred, DeferredError};
//!
//! # tokio_test::block_on(async {
//! let (settler, promise) = Deferred::<u32, String>::new().split();
//!
//! std::thread::spawn(move || {
//!     settler.resolve(42);
//! });
//!
//! assert_eq!(promise.await, Ok(42));
//! # });
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::{abortable, Abortable};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::debug;

pub use futures::future::{AbortHandle as CancelHandle, Aborted};

/// Outcome of a promise that did not fulfil
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredError<E> {
    /// The deferred was rejected with this reason
    Rejected(E),
    /// Every settler was dropped before the deferred was settled
    Abandoned,
}

impl<E: fmt::Display> fmt::Display for DeferredError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeferredError::Rejected(reason) => write!(f, "Promise rejected: {}", reason),
            DeferredError::Abandoned => write!(f, "Promise abandoned without settlement"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for DeferredError<E> {}

impl<E> DeferredError<E> {
    /// Get the rejection reason, if this is a rejection
    pub fn rejection(self) -> Option<E> {
        match self {
            DeferredError::Rejected(reason) => Some(reason),
            DeferredError::Abandoned => None,
        }
    }
}

struct Shared<T, E> {
    sender: Option<oneshot::Sender<Result<T, E>>>,
    timer: Option<tokio::task::AbortHandle>,
}

/// Producer side of a [`Deferred`]
pub struct Settler<T, E> {
    shared: Arc<Mutex<Shared<T, E>>>,
}

impl<T, E> Clone for Settler<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> fmt::Debug for Settler<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settler")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl<T, E> Settler<T, E> {
    fn lock(&self) -> MutexGuard<'_, Shared<T, E>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fulfil the promise with `value`
    ///
    /// Returns `false` if the deferred was already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Reject the promise with `reason`
    ///
    /// Returns `false` if the deferred was already settled.
    pub fn reject(&self, reason: E) -> bool {
        self.settle(Err(reason))
    }

    /// Whether resolve or reject has already taken effect
    pub fn is_settled(&self) -> bool {
        self.lock().sender.is_none()
    }

    /// Disarm a pending timeout without settling
    pub fn clear_timeout(&self) {
        if let Some(timer) = self.lock().timer.take() {
            timer.abort();
        }
    }

    fn settle(&self, outcome: Result<T, E>) -> bool {
        let sender = {
            let mut guard = self.lock();
            if let Some(timer) = guard.timer.take() {
                timer.abort();
            }
            guard.sender.take()
        };

        match sender {
            Some(sender) => {
                // A dropped promise still counts as settled
                let _ = sender.send(outcome);
                true
            }
            None => {
                debug!("Ignoring settlement of an already settled deferred");
                false
            }
        }
    }

    fn settle_from_timer(&self, reason: E) {
        let sender = {
            let mut guard = self.lock();
            guard.timer = None;
            guard.sender.take()
        };

        if let Some(sender) = sender {
            debug!("Deferred timed out");
            let _ = sender.send(Err(reason));
        }
    }
}

impl<T, E> Settler<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Reject the deferred with `reason` once `duration` elapses
    ///
    /// Calling this again replaces the previous timer. Any settlement disarms
    /// the timer. Has no effect on an already settled deferred.
    ///
    /// Must be called from within a tokio runtime.
    pub fn timeout(&self, duration: Duration, reason: E) {
        let mut guard = self.lock();
        if guard.sender.is_none() {
            return;
        }
        if let Some(previous) = guard.timer.take() {
            previous.abort();
        }

        let settler = self.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            settler.settle_from_timer(reason);
        });
        guard.timer = Some(task.abort_handle());
    }
}

/// Consumer side of a [`Deferred`]
///
/// Resolves to `Ok(value)` when fulfilled, or a [`DeferredError`] otherwise.
#[derive(Debug)]
pub struct Promise<T, E> {
    receiver: oneshot::Receiver<Result<T, E>>,
}

impl<T, E> Promise<T, E> {
    /// Take the outcome without waiting
    ///
    /// Returns `None` while the deferred is unsettled. The outcome can only
    /// be taken once.
    pub fn try_take(&mut self) -> Option<Result<T, DeferredError<E>>> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome.map_err(DeferredError::Rejected)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(DeferredError::Abandoned)),
        }
    }
}

impl<T, E> Future for Promise<T, E> {
    type Output = Result<T, DeferredError<E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| match received {
                Ok(outcome) => outcome.map_err(DeferredError::Rejected),
                Err(_) => Err(DeferredError::Abandoned),
            })
    }
}

/// A promise together with the functions to settle it
pub struct Deferred<T, E> {
    settler: Settler<T, E>,
    promise: Promise<T, E>,
}

impl<T, E> Deferred<T, E> {
    /// Create an unsettled deferred
    pub fn new() -> Self {
        let (sender, receiver) = oneshot::channel();
        Self {
            settler: Settler {
                shared: Arc::new(Mutex::new(Shared {
                    sender: Some(sender),
                    timer: None,
                })),
            },
            promise: Promise { receiver },
        }
    }

    /// Get another handle that can settle this deferred
    pub fn settler(&self) -> Settler<T, E> {
        self.settler.clone()
    }

    /// See [`Settler::resolve`]
    pub fn resolve(&self, value: T) -> bool {
        self.settler.resolve(value)
    }

    /// See [`Settler::reject`]
    pub fn reject(&self, reason: E) -> bool {
        self.settler.reject(reason)
    }

    /// Split into the producer and consumer halves
    pub fn split(self) -> (Settler<T, E>, Promise<T, E>) {
        (self.settler, self.promise)
    }

    /// Keep only the promise
    ///
    /// The deferred's own settler is dropped, so the promise is abandoned
    /// unless another settler was taken with [`Deferred::settler`] first.
    pub fn into_promise(self) -> Promise<T, E> {
        self.promise
    }
}

impl<T, E> Default for Deferred<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.settler.is_settled())
            .finish()
    }
}

/// Race `future` against a timer, failing with `reason` if the timer wins
pub async fn promise_timeout<F, T, E>(duration: Duration, reason: E, future: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(duration, future).await {
        Ok(outcome) => outcome,
        Err(_) => Err(reason),
    }
}

/// Wrap `future` so it can be cut off from its outcome
///
/// After [`CancelHandle::abort`] the wrapped future completes with
/// `Err(Aborted)` and the inner outcome is discarded.
pub fn make_cancellable<F: Future>(future: F) -> (Abortable<F>, CancelHandle) {
    abortable(future)
}

/// Like [`make_cancellable`], handing the cancel handle to `install`
pub fn install_cancellable<F, C>(future: F, install: C) -> Abortable<F>
where
    F: Future,
    C: FnOnce(CancelHandle),
{
    let (wrapped, handle) = make_cancellable(future);
    install(handle);
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_then_reject() {
        let (settler, promise) = Deferred::<i32, String>::new().split();

        assert!(settler.resolve(7));
        assert!(!settler.reject("too late".to_string()));
        assert!(settler.is_settled());

        assert_eq!(promise.await, Ok(7));
    }

    #[tokio::test]
    async fn test_reject_then_resolve() {
        let (settler, promise) = Deferred::<i32, String>::new().split();

        assert!(settler.reject("failed".to_string()));
        assert!(!settler.resolve(7));

        assert_eq!(
            promise.await,
            Err(DeferredError::Rejected("failed".to_string()))
        );
    }

    #[tokio::test]
    async fn test_settle_from_another_task() {
        let deferred = Deferred::<&'static str, ()>::new();
        let settler = deferred.settler();
        let promise = deferred.into_promise();

        tokio::spawn(async move {
            settler.resolve("done");
        });

        assert_eq!(promise.await, Ok("done"));
    }

    #[tokio::test]
    async fn test_abandoned_when_settlers_dropped() {
        let (settler, promise) = Deferred::<i32, ()>::new().split();
        let second = settler.clone();
        drop(settler);
        drop(second);

        assert_eq!(promise.await, Err(DeferredError::Abandoned));
    }

    #[test]
    fn test_pending_until_settled() {
        let deferred = Deferred::<i32, ()>::new();
        let settler = deferred.settler();
        let mut promise = deferred.into_promise();

        assert!(promise.try_take().is_none());
        settler.resolve(3);
        assert_eq!(promise.try_take(), Some(Ok(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_rejects() {
        let (settler, promise) = Deferred::<i32, &'static str>::new().split();
        settler.timeout(Duration::from_secs(5), "timed out");

        assert_eq!(promise.await, Err(DeferredError::Rejected("timed out")));
        assert!(settler.is_settled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settlement_disarms_timeout() {
        let (settler, promise) = Deferred::<i32, &'static str>::new().split();
        settler.timeout(Duration::from_secs(5), "timed out");
        assert!(settler.resolve(1));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(promise.await, Ok(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearming_replaces_timeout() {
        let (settler, mut promise) = Deferred::<i32, &'static str>::new().split();
        settler.timeout(Duration::from_secs(5), "first");
        settler.timeout(Duration::from_secs(10), "second");

        tokio::time::sleep(Duration::from_secs(7)).await;
        assert!(promise.try_take().is_none());
        assert!(!settler.is_settled());

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(
            promise.try_take(),
            Some(Err(DeferredError::Rejected("second")))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_timeout() {
        let (settler, mut promise) = Deferred::<i32, &'static str>::new().split();
        settler.timeout(Duration::from_secs(5), "timed out");
        settler.clear_timeout();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(promise.try_take().is_none());
        assert!(!settler.is_settled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_promise_timeout() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, &'static str>(1)
        };
        assert_eq!(
            promise_timeout(Duration::from_secs(1), "slow", slow).await,
            Err("slow")
        );

        let fast = async { Ok::<_, &'static str>(2) };
        assert_eq!(
            promise_timeout(Duration::from_secs(1), "slow", fast).await,
            Ok(2)
        );
    }

    #[tokio::test]
    async fn test_cancellable() {
        let (settler, promise) = Deferred::<i32, ()>::new().split();
        let (wrapped, handle) = make_cancellable(promise);

        handle.abort();
        settler.resolve(5);

        assert_eq!(wrapped.await, Err(Aborted));
    }

    #[tokio::test]
    async fn test_install_cancellable_passes_through() {
        let mut installed = None;
        let wrapped = install_cancellable(async { 9 }, |handle| installed = Some(handle));

        assert!(installed.is_some());
        assert_eq!(wrapped.await, Ok(9));
    }
}
