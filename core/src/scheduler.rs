//! Fixed-size worker pool used by the index builder.
//!
//! Work is queued on an unbounded FIFO channel. Idle workers block on the
//! channel and wake when work arrives or when the scheduler shuts down.
//! Every submission returns a [`TaskHandle`] carrying the work's outcome: its
//! value, or [`SearchError::TaskFailed`] if the work panicked. Shutdown closes
//! the queue to new work but lets workers drain whatever is already queued.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, SendError, Sender};
use parking_lot::Mutex;

use crate::error::{Result, SearchError};

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct TaskScheduler {
    /// `None` once shut down.
    sender: Mutex<Option<Sender<Job>>>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
    worker_count: usize,
}

impl TaskScheduler {
    /// Spawn `worker_count` workers (at least one).
    pub fn new(worker_count: usize) -> Result<Self> {
        let worker_count = worker_count.max(1);
        let (sender, receiver) = unbounded::<Job>();

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("index-worker-{worker_id}"))
                .spawn(move || worker_loop(worker_id, receiver))?;
            workers.push(handle);
        }
        tracing::debug!(worker_count, "task scheduler started");

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            worker_count,
        })
    }

    /// One worker per available hardware thread.
    pub fn with_default_workers() -> Result<Self> {
        Self::new(num_cpus::get())
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Queue `work` and return a handle to its outcome.
    pub fn submit<F, T>(&self, work: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (outcome_tx, outcome_rx) = bounded(1);
        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(work))
                .map_err(|payload| SearchError::TaskFailed(panic_message(payload.as_ref())));
            if let Err(SendError(Err(err))) = outcome_tx.send(outcome) {
                tracing::warn!(error = %err, "task failed after its handle was dropped");
            }
        });

        let guard = self.sender.lock();
        let sender = guard.as_ref().ok_or(SearchError::SchedulerClosed)?;
        sender.send(job).map_err(|_| SearchError::SchedulerClosed)?;
        Ok(TaskHandle { receiver: outcome_rx })
    }

    /// Stop accepting work, let the workers drain the queue, then join them.
    /// Calling it more than once is a no-op.
    pub fn shutdown(&self) {
        // Dropping the last sender disconnects the channel; workers exit once
        // it is both disconnected and empty.
        drop(self.sender.lock().take());

        let workers = std::mem::take(&mut *self.workers.lock());
        let current = thread::current().id();
        for handle in workers {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                tracing::error!("index worker terminated abnormally");
            }
        }
    }
}

impl Drop for TaskScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Outcome of one submitted unit of work.
#[must_use = "a task's failure is only observable through its handle"]
pub struct TaskHandle<T> {
    receiver: Receiver<Result<T>>,
}

impl<T> TaskHandle<T> {
    /// Block until the work has run and return its outcome.
    pub fn wait(self) -> Result<T> {
        self.receiver.recv().map_err(|_| {
            SearchError::TaskFailed("worker exited before reporting an outcome".into())
        })?
    }
}

fn worker_loop(worker_id: usize, receiver: Receiver<Job>) {
    for job in receiver.iter() {
        job();
    }
    tracing::debug!(worker_id, "index worker exiting");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "task panicked".to_string()
    }
}
