//! # taskgraph-runtime
//!
//! The worker pool: a fixed number of long-lived OS threads, dispatched
//! to via a counting semaphore so that `submit` blocks the caller
//! instead of queuing work unboundedly once the pool is saturated.
//!
//! Platform-agnostic; built entirely on `std::thread`/`std::sync`.

mod pool;
mod semaphore;

pub use pool::{Pool, WorkerId};
pub use semaphore::Semaphore;
