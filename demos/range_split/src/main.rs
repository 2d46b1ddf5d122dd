//! Range-split example
//!
//! `taskgraph-util::split_range` is not consumed by the engine itself -
//! it is a peripheral helper for callers who want to parallelize a
//! loop. This demo sums `0..1_000_000` by handing each worker its own
//! contiguous slice as a `Task`, then a join task adds up the partial
//! sums.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use taskgraph::{Engine, Task, TaskGraph};
use taskgraph_util::split_range;

fn main() {
    const TOTAL: u64 = 1_000_000;
    const WORKERS: usize = 4;

    println!("=== taskgraph range-split example ===\n");

    let graph = TaskGraph::new();
    let partials = Arc::new(Mutex::new(vec![0u64; WORKERS]));

    let mut chunk_tasks = Vec::new();
    for (i, range) in split_range(TOTAL as usize, WORKERS).into_iter().enumerate() {
        println!("worker {} gets {:?} ({} elements)", i, range, range.len());
        let partials = partials.clone();
        let t = Task::with_execute(move || {
            let sum: u64 = range.map(|n| n as u64).sum();
            partials.lock().unwrap()[i] = sum;
        });
        graph.add_task(t.clone()).expect("chunk task has no owner yet");
        chunk_tasks.push(t);
    }

    let total_result = Arc::new(AtomicU64::new(0));
    let tr = total_result.clone();
    let pr = partials.clone();
    let join = Task::with_execute(move || {
        let sum: u64 = pr.lock().unwrap().iter().sum();
        tr.store(sum, Ordering::SeqCst);
    });
    graph.add_task(join.clone()).expect("join has no owner yet");

    for t in &chunk_tasks {
        t.add_dependency_to(&join).expect("chunk -> join is not a cycle");
    }

    Engine::new(WORKERS).execute(&graph);

    let expected = TOTAL * (TOTAL - 1) / 2;
    let got = total_result.load(Ordering::SeqCst);
    println!("\nsum of 0..{} = {} (expected {})", TOTAL, got, expected);
    assert_eq!(got, expected);
}
