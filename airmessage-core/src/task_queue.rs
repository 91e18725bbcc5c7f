//! Ordered Task Queue
//!
//! Runs asynchronous tasks one after another in the order they were enqueued.
//! A task's closure is only invoked once every task before it has completed,
//! which serializes flows such as read-modify-write updates of the message
//! cache.

use std::convert::Infallible;
use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::deferred::{Deferred, Promise};

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Serial executor for asynchronous tasks
pub struct TaskQueue {
    sender: mpsc::UnboundedSender<Job>,
    worker: JoinHandle<()>,
}

impl TaskQueue {
    /// Start a queue worker on the current tokio runtime
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        let worker = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                // Isolate panics so one failed task doesn't stall the queue
                if let Err(e) = tokio::spawn(job()).await {
                    warn!("Queued task failed: {}", e);
                }
            }
            debug!("Task queue drained");
        });

        Self { sender, worker }
    }

    /// Enqueue a task
    ///
    /// `task` is called when all previously enqueued tasks have completed.
    /// The returned promise resolves to the task's output; it is abandoned if
    /// the task panics.
    pub fn enqueue<F, Fut, T>(&self, task: F) -> Promise<T, Infallible>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (settler, promise) = Deferred::new().split();

        let job: Job = Box::new(move || {
            async move {
                settler.resolve(task().await);
            }
            .boxed()
        });

        if self.sender.send(job).is_err() {
            warn!("Task queue worker is gone, dropping task");
        }

        promise
    }

    /// Stop accepting tasks and wait for the queued ones to finish
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(e) = self.worker.await {
            warn!("Task queue worker failed: {}", e);
        }
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
