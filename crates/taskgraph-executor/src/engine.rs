//! `Engine`: the dataflow scheduler. Walks a frozen `TaskGraph` by
//! dependency-satisfaction counting, submitting ready tasks to a worker
//! pool and terminating when the root graph's `end` sentinel is
//! dequeued.

use std::sync::Arc;

use taskgraph_core::{taskgraph_debug, taskgraph_trace, Task, TaskGraph};
use taskgraph_runtime::Pool;

use crate::queue::ReadyQueue;

/// Owns a worker pool for its whole lifetime and runs `TaskGraph`s
/// against it. A single `Engine` can `execute` many graphs, one after
/// another: per-task completion counters are reset at the start of each
/// call, so a graph is re-executable.
pub struct Engine {
    pool: Pool,
}

impl Engine {
    /// An engine backed by a pool of exactly `n` workers.
    pub fn new(n: usize) -> Self {
        Engine { pool: Pool::new(n) }
    }

    /// An engine sized from `TASKGRAPH_WORKERS`, falling back to
    /// `std::thread::available_parallelism()` (minimum 1).
    pub fn new_default() -> Self {
        Engine {
            pool: Pool::new_default(),
        }
    }

    /// Number of worker threads backing this engine.
    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    /// Run `root` to completion, blocking the calling thread until every
    /// reachable non-dummy task has executed exactly once. The graph is
    /// treated as frozen for the duration of the call: structural
    /// mutations must not race with `execute`.
    pub fn execute(&self, root: &TaskGraph) {
        reset_pass_state(root);

        let queue = Arc::new(ReadyQueue::new());
        let end_id = root.end().id();

        queue.push(root.start());

        loop {
            let t = queue.pop();
            if t.id() == end_id {
                taskgraph_debug!("execution reached root end, returning");
                break;
            }
            self.dispatch(t, &queue);
        }
    }

    /// Hand one ready task off to be run. Dummy sentinels bypass the
    /// pool entirely and run their (empty) body plus completion callback
    /// synchronously on the caller's thread: routing `start` through the
    /// pool would consume a worker slot for nothing and, since `start`
    /// is produced before any worker could have consumed it, risks
    /// deadlock at `N=1`.
    fn dispatch(&self, t: Task, queue: &Arc<ReadyQueue>) {
        if t.is_dummy() {
            taskgraph_trace!("bypassing pool for dummy task {}", t.id());
            on_complete(&t, queue);
            return;
        }

        let queue = queue.clone();
        let t_id = t.id().as_u64();
        self.pool.submit(move || {
            taskgraph_core::tglog::set_task_id(t_id);
            taskgraph_trace!("running task {}", t_id);
            t.run();
            on_complete(&t, &queue);
            taskgraph_core::tglog::clear_task_id();
        });
    }
}

/// Walk `root` and every transitively contained sub-graph, zeroing each
/// member task's per-pass completion counter. Done before every
/// `execute` call so graphs are re-executable.
fn reset_pass_state(root: &TaskGraph) {
    root.start().reset_pass_state();
    root.end().reset_pass_state();
    for t in root.all_member_tasks() {
        t.reset_pass_state();
    }
}

/// For each out-edge `t -> s`, atomically increment `s`'s satisfied
/// predecessor count; if that was the last predecessor `s` needed,
/// enqueue it. The per-task mutex backing `notify_predecessor_done`
/// serializes concurrent callbacks from different worker threads that
/// target the same successor.
fn on_complete(t: &Task, queue: &ReadyQueue) {
    for s in t.out_edges() {
        if s.notify_predecessor_done() {
            queue.push(s);
        }
    }
}
