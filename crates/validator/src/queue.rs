//! Cooperative deferred-task queue
//!
//! Summary notifications of a validation pass are not delivered inline: they
//! are queued here and run when the host flushes the queue, after the pass
//! and any other synchronous work of the current turn.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

type Task = Box<dyn FnOnce() + Send>;

/// FIFO of deferred tasks. Clones share the same queue.
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Arc<Mutex<VecDeque<Task>>>,
}

impl TaskQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` for the next flush.
    pub fn defer<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.tasks.lock().push_back(Box::new(task));
    }

    /// Runs the tasks that were pending when called, in order, and returns
    /// how many ran.
    ///
    /// Tasks deferred while flushing wait for the next flush. The lock is not
    /// held while a task runs.
    pub fn flush(&self) -> usize {
        let batch = std::mem::take(&mut *self.tasks.lock());
        let count = batch.len();
        for task in batch {
            task();
        }
        count
    }

    /// Flushes until no task is left, returning the total run.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.flush();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Whether no task is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.len())
            .finish()
    }
}
