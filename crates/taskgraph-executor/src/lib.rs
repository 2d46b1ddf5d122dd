//! # taskgraph-executor
//!
//! The executor: a dataflow scheduler that walks a [`taskgraph_core::TaskGraph`]
//! by dependency-satisfaction counting, submits ready tasks to a
//! [`taskgraph_runtime::Pool`], and terminates on the root graph's `end`
//! sentinel.
//!
//! `Engine` is the sole public type; see [`Engine::execute`].

mod engine;
mod queue;

pub use engine::Engine;
