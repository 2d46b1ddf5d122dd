//! Fan-in example
//!
//! Four independent producer tasks each increment a shared counter; a
//! join task depends on all four and asserts the counter reached 4
//! before it runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use taskgraph::{Engine, Task, TaskGraph};

fn main() {
    println!("=== taskgraph fan-in example ===\n");

    let graph = TaskGraph::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let mut producers = Vec::new();
    for i in 0..4 {
        let c = counter.clone();
        let t = Task::with_execute(move || {
            let now = c.fetch_add(1, Ordering::SeqCst) + 1;
            println!("[producer {}] counter now {}", i, now);
        });
        graph.add_task(t.clone()).expect("producer has no owner yet");
        producers.push(t);
    }

    let c = counter.clone();
    let join = Task::with_execute(move || {
        let seen = c.load(Ordering::SeqCst);
        println!("[join] all producers done, counter = {}", seen);
        assert_eq!(seen, 4);
    });
    graph.add_task(join.clone()).expect("join has no owner yet");

    for p in &producers {
        p.add_dependency_to(&join).expect("producer -> join is not a cycle");
    }

    Engine::new(4).execute(&graph);

    println!("\nfinal counter = {}", counter.load(Ordering::SeqCst));
}
