//! # taskgraph
//!
//! Describe a computation as a DAG of [`Task`]s and nested [`TaskGraph`]s,
//! then hand the root graph to an [`Engine`] to run it across a
//! fixed-size pool of worker threads, respecting every dependency edge.
//!
//! This facade crate re-exports the three layers most callers need under
//! one namespace:
//!
//! - [`taskgraph_core`] - the DAG model (`Task`, `TaskGraph`, `TaskElement`,
//!   dependency edges, the incremental cycle check) and the two error
//!   kinds structural operations can raise.
//! - [`taskgraph_runtime`] - the worker pool `Engine` dispatches onto.
//! - [`taskgraph_executor`] - `Engine` itself.
//!
//! ## Quick start
//!
//! ```
//! use taskgraph::{Engine, Task, TaskGraph};
//!
//! let graph = TaskGraph::new();
//! let a = Task::with_execute(|| println!("a"));
//! let b = Task::with_execute(|| println!("b"));
//! graph.add_task(a.clone()).unwrap();
//! graph.add_task(b.clone()).unwrap();
//! a.add_dependency_to(&b).unwrap();
//!
//! let engine = Engine::new(4);
//! engine.execute(&graph);
//! ```
//!
//! Sub-graphs nest the same way: build a smaller `TaskGraph`, attach it
//! to a parent with [`TaskGraph::add_subgraph`], and declare dependencies
//! between sub-graphs (or between a sub-graph and a bare task) exactly as
//! you would between two tasks - `add_dependency_to` accepts either.
//!
//! For the peripheral work-splitting helper (not consumed by the engine
//! itself, but part of the same external interface), see
//! [`taskgraph_util`].

pub use taskgraph_core::{
    env, tglog, CycleError, ParentingError, Task, TaskElement, TaskGraph, TaskGraphError,
    TaskGraphResult,
};
pub use taskgraph_core::{GraphId, TaskId};
pub use taskgraph_executor::Engine;
pub use taskgraph_runtime::{Pool, Semaphore, WorkerId};
