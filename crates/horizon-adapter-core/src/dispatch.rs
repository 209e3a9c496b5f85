//! Posting work to the UI-owning thread.
//!
//! [`UiDispatcher`] is a multi-producer queue of deferred tasks drained by the
//! UI thread. Any thread may [`post`](UiDispatcher::post); only the owner
//! thread may [`run_pending`](UiDispatcher::run_pending). Once posted, a task
//! always runs on the next drain; there is no cancellation.
//!
//! Host integrations typically call `run_pending` from their event loop's
//! idle hook.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

use crate::logging::targets;
use crate::thread_check::ThreadAffinity;

/// A unique identifier for a posted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Global counter for generating unique task IDs.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

/// A boxed task closure.
type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

struct TaskData {
    id: TaskId,
    task: BoxedTask,
}

/// Queue of tasks to run on the UI-owning thread.
///
/// Cloning a dispatcher yields another handle to the same queue.
#[derive(Clone)]
pub struct UiDispatcher {
    sender: Sender<TaskData>,
    receiver: Receiver<TaskData>,
    owner: ThreadAffinity,
}

impl Default for UiDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UiDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiDispatcher")
            .field("pending", &self.pending_count())
            .field("owner", &self.owner.thread_id())
            .finish()
    }
}

impl UiDispatcher {
    /// Creates a dispatcher owned by the current thread.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            owner: ThreadAffinity::current(),
        }
    }

    /// Returns `true` if the calling thread is the UI-owning thread.
    pub fn is_ui_thread(&self) -> bool {
        self.owner.is_same_thread()
    }

    /// Queues `task` to run on the UI thread during the next drain.
    pub fn post<F>(&self, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = next_task_id();
        // Both ends live in `self`, so the channel cannot be disconnected here.
        let _ = self.sender.send(TaskData {
            id,
            task: Box::new(task),
        });
        tracing::trace!(target: targets::DISPATCH, task = id.as_u64(), "task posted");
        id
    }

    /// Number of tasks waiting to run.
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Runs every task queued so far, in posting order.
    ///
    /// Tasks posted by the tasks themselves run in the same drain. Returns the
    /// number of tasks executed.
    ///
    /// # Panics
    ///
    /// Panics (when thread checks are enabled) if called off the owner thread.
    pub fn run_pending(&self) -> usize {
        self.owner
            .debug_assert_same_thread_with_msg("UiDispatcher::run_pending called off the UI thread");

        let mut executed = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(TaskData { id, task }) => {
                    tracing::trace!(target: targets::DISPATCH, task = id.as_u64(), "running task");
                    task();
                    executed += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        executed
    }
}

static_assertions::assert_impl_all!(UiDispatcher: Send, Sync);
