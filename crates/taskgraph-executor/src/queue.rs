//! The executor's ready queue: a thread-safe FIFO of tasks whose
//! predecessors have all completed. Completion callbacks running on
//! worker threads push into it concurrently; the executor's main loop
//! pops from it, blocking when empty, the same acquire/release shape
//! the worker pool uses for its own ready queue of idle workers.

use std::collections::VecDeque;
use std::sync::Mutex;

use taskgraph_core::Task;
use taskgraph_runtime::Semaphore;

/// Blocking FIFO queue of ready tasks. A permit count (via `Semaphore`)
/// tracks how many items are waiting so `pop` can block cleanly instead
/// of spinning.
pub(crate) struct ReadyQueue {
    items: Mutex<VecDeque<Task>>,
    available: Semaphore,
}

impl ReadyQueue {
    pub(crate) fn new() -> Self {
        ReadyQueue {
            items: Mutex::new(VecDeque::new()),
            available: Semaphore::new(0),
        }
    }

    /// Enqueue `task`, waking one blocked `pop` if any.
    pub(crate) fn push(&self, task: Task) {
        self.items.lock().unwrap().push_back(task);
        self.available.release();
    }

    /// Block until a task is ready, then dequeue and return it.
    pub(crate) fn pop(&self) -> Task {
        self.available.acquire();
        self.items
            .lock()
            .unwrap()
            .pop_front()
            .expect("ready queue permit without a matching item")
    }
}
