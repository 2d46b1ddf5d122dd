//! Basic taskgraph example
//!
//! Two tasks, one dependency: builds `a -> b`, runs it on a two-worker
//! engine, and shows that `b` only starts once `a` has finished.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use taskgraph::{Engine, Task, TaskGraph};

fn main() {
    println!("=== taskgraph basic example ===\n");

    let graph = TaskGraph::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let c1 = counter.clone();
    let a = Task::with_execute(move || {
        println!("[a] running");
        c1.fetch_add(1, Ordering::SeqCst);
    });

    let c2 = counter.clone();
    let b = Task::with_execute(move || {
        let seen = c2.load(Ordering::SeqCst);
        println!("[b] running, observed counter = {}", seen);
        c2.fetch_add(1, Ordering::SeqCst);
    });

    graph.add_task(a.clone()).expect("a has no owner yet");
    graph.add_task(b.clone()).expect("b has no owner yet");
    a.add_dependency_to(&b).expect("a -> b is not a cycle");

    let engine = Engine::new(2);
    engine.execute(&graph);

    println!("\nfinal counter = {}", counter.load(Ordering::SeqCst));
}
