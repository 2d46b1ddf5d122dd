//! Fixed-size worker pool: N long-lived OS threads bounding concurrent
//! execution to N, with the `submit` call itself blocking while the pool
//! is saturated rather than queuing unboundedly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_queue::ArrayQueue;
use taskgraph_core::env::env_get_opt;
use taskgraph_core::{taskgraph_debug, taskgraph_trace};

pub type WorkerId = usize;

type WorkItem = Box<dyn FnOnce() + Send + 'static>;

struct Worker {
    wake: Arc<super::semaphore::Semaphore>,
    slot: Mutex<Option<WorkItem>>,
}

struct PoolInner {
    workers: Vec<Worker>,
    ready: ArrayQueue<WorkerId>,
    admission: super::semaphore::Semaphore,
    shutdown: AtomicBool,
}

/// A pool of `N` worker threads. `submit` blocks the caller while all `N`
/// workers are busy; once a worker frees up, the call dispatches to it
/// and returns immediately.
pub struct Pool {
    inner: Arc<PoolInner>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Pool {
    /// Spawn a pool of exactly `n` worker threads (`n` clamped to at
    /// least 1).
    pub fn new(n: usize) -> Self {
        let n = n.max(1);
        let mut workers = Vec::with_capacity(n);
        for _ in 0..n {
            workers.push(Worker {
                wake: Arc::new(super::semaphore::Semaphore::new(0)),
                slot: Mutex::new(None),
            });
        }
        let ready = ArrayQueue::new(n);
        for id in 0..n {
            // cannot fail: capacity is exactly n
            let _ = ready.push(id);
        }

        let inner = Arc::new(PoolInner {
            workers,
            ready,
            admission: super::semaphore::Semaphore::new(n),
            shutdown: AtomicBool::new(false),
        });

        let mut handles = Vec::with_capacity(n);
        for worker_id in 0..n {
            let inner = inner.clone();
            let handle = thread::Builder::new()
                .name(format!("taskgraph-worker-{}", worker_id))
                .spawn(move || worker_loop(inner, worker_id))
                .expect("failed to spawn worker thread");
            handles.push(handle);
        }

        Pool {
            inner,
            handles: Mutex::new(handles),
        }
    }

    /// Size the pool from `TASKGRAPH_WORKERS`, falling back to
    /// `std::thread::available_parallelism()` (minimum 1).
    pub fn new_default() -> Self {
        let n: usize = env_get_opt("TASKGRAPH_WORKERS").unwrap_or_else(|| {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        });
        Self::new(n)
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.inner.workers.len()
    }

    /// Run `work` on a worker thread. Blocks the caller until a worker is
    /// available, then returns as soon as the work has been handed off
    /// (not once it completes).
    pub fn submit(&self, work: impl FnOnce() + Send + 'static) {
        self.inner.admission.acquire();
        // Spin briefly: a worker id is guaranteed to be in the ready
        // queue once admission was granted, but the push from the
        // previous occupant may not yet be visible on this thread.
        let worker_id = loop {
            if let Some(id) = self.inner.ready.pop() {
                break id;
            }
            std::hint::spin_loop();
        };

        let worker = &self.inner.workers[worker_id];
        *worker.slot.lock().unwrap() = Some(Box::new(work));
        taskgraph_trace!("dispatching to worker {}", worker_id);
        worker.wake.release();
    }

    /// Signal every worker thread to exit once idle, and join them all.
    /// Blocks until all worker threads have terminated.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::SeqCst);
        for worker in &self.inner.workers {
            worker.wake.release();
        }
        let mut handles = self.handles.lock().unwrap();
        for handle in handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        if !self.inner.shutdown.swap(true, Ordering::SeqCst) {
            for worker in &self.inner.workers {
                worker.wake.release();
            }
        }
        let mut handles = self.handles.lock().unwrap();
        for handle in handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(inner: Arc<PoolInner>, worker_id: WorkerId) {
    taskgraph_core::tglog::set_worker_id(worker_id as u32);
    taskgraph_debug!("worker {} starting", worker_id);
    loop {
        inner.workers[worker_id].wake.acquire();

        let work = inner.workers[worker_id].slot.lock().unwrap().take();
        match work {
            Some(work) => {
                work();
                // The completion callback embedded in `work` (if any) has
                // already run by this point; only now does the worker make
                // itself available again.
                let _ = inner.ready.push(worker_id);
                inner.admission.release();
            }
            None => {
                // Woken with no work queued: this is the shutdown signal.
                break;
            }
        }
    }
    taskgraph_debug!("worker {} exiting", worker_id);
    taskgraph_core::tglog::clear_worker_id();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Barrier;
    use std::time::Duration;

    #[test]
    fn submit_runs_work() {
        let pool = Pool::new(2);
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        pool.submit(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        thread::sleep(Duration::from_millis(50));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        pool.shutdown();
    }

    #[test]
    fn submit_blocks_when_pool_saturated() {
        let pool = Arc::new(Pool::new(1));
        let barrier = Arc::new(Barrier::new(2));
        let b = barrier.clone();
        pool.submit(move || {
            b.wait();
            thread::sleep(Duration::from_millis(50));
        });

        let started = Arc::new(AtomicUsize::new(0));
        let s = started.clone();
        let pool2 = pool.clone();
        let handle = thread::spawn(move || {
            pool2.submit(move || {
                s.fetch_add(1, Ordering::SeqCst);
            });
        });

        barrier.wait();
        thread::sleep(Duration::from_millis(10));
        // second submit should still be blocked on admission
        assert_eq!(started.load(Ordering::SeqCst), 0);

        handle.join().unwrap();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(started.load(Ordering::SeqCst), 1);
        pool.shutdown();
    }

    #[test]
    fn many_tasks_all_run_exactly_once() {
        let pool = Pool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let c = counter.clone();
            pool.submit(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        // drain: submit one more and wait for it, as a crude barrier
        let done = Arc::new(AtomicUsize::new(0));
        let d = done.clone();
        pool.submit(move || {
            d.store(1, Ordering::SeqCst);
        });
        for _ in 0..200 {
            if done.load(Ordering::SeqCst) == 1 {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }
}
