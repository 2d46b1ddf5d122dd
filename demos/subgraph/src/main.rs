//! Sub-graph nesting example
//!
//! Builds two small sub-graphs, `g1` (a single task) and `g2` (a single
//! task), attaches both under a root graph, and declares a cross-boundary
//! dependency `g1 -> g2`. `g2`'s task only becomes ready once every task
//! inside `g1` has finished, even though the dependency is declared
//! between the sub-graphs themselves rather than between the tasks.

use std::sync::Arc;
use std::sync::Mutex;

use taskgraph::{Engine, Task, TaskGraph};

fn main() {
    println!("=== taskgraph sub-graph nesting example ===\n");

    let root = TaskGraph::new();
    let g1 = TaskGraph::new();
    let g2 = TaskGraph::new();

    let order = Arc::new(Mutex::new(Vec::new()));

    let o1 = order.clone();
    let t1 = Task::with_execute(move || {
        println!("[g1/t1] running");
        o1.lock().unwrap().push("t1");
    });
    g1.add_task(t1).expect("t1 has no owner yet");

    let o2 = order.clone();
    let t2 = Task::with_execute(move || {
        println!("[g2/t2] running");
        o2.lock().unwrap().push("t2");
    });
    g2.add_task(t2).expect("t2 has no owner yet");

    root.add_subgraph(g1.clone()).expect("g1 has no parent yet");
    root.add_subgraph(g2.clone()).expect("g2 has no parent yet");
    g1.add_dependency_to(&g2).expect("g1 -> g2 is not a cycle");

    Engine::new(2).execute(&root);

    println!("\nobserved order: {:?}", order.lock().unwrap());
}
