//! # taskgraph-core
//!
//! Core types for the task-graph execution engine: the DAG model
//! (`Task`, `TaskGraph`, dependency edges), id allocation, error types,
//! logging, and environment configuration.
//!
//! This crate is platform-agnostic and pulls in no third-party runtime
//! dependencies; the worker pool and executor that actually run a graph
//! live in `taskgraph-runtime` and `taskgraph-executor`.
//!
//! ## Modules
//!
//! - `graph` - `Task`, `TaskGraph`, `TaskElement`, dependency edges, cycle check
//! - `id` - process-wide `TaskId`/`GraphId` allocation
//! - `error` - `TaskGraphError`, `CycleError`, `ParentingError`
//! - `spinlock` - internal spinlock primitive
//! - `tglog` - environment-configured debug printing macros
//! - `env` - environment variable utilities

#![allow(dead_code)]

pub mod env;
pub mod error;
pub mod graph;
pub mod id;
pub mod spinlock;
pub mod tglog;

// Re-exports for convenience
pub use env::{env_get, env_get_bool, env_get_opt, env_get_str, env_is_set};
pub use error::{CycleError, ParentingError, TaskGraphError, TaskGraphResult};
pub use graph::{Task, TaskElement, TaskGraph};
pub use id::{GraphId, TaskId};
pub use spinlock::SpinLock;
pub use tglog::LogLevel;
