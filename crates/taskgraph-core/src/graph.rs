//! The DAG model: `Task`, `TaskGraph`, and the generic dependency-edge
//! algorithm shared by every combination of the two.
//!
//! The tricky part of this module is not the data structure itself but
//! the "spine" maintenance: every `TaskGraph` keeps a `start` and `end`
//! sentinel wired so that `start` transitively reaches every member and
//! every member transitively reaches `end`. Declaring a user dependency
//! can make part of that spine redundant, and the model eagerly drops
//! the redundant edges so the DAG reflects real structure rather than
//! carrying dead wiring. If the new edge would create a cycle, the
//! speculative removal has to be undone exactly, which is why
//! `retarget` below looks like a miniature transaction log instead of a
//! one-line edge insertion.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use crate::error::{CycleError, ParentingError, TaskGraphError, TaskGraphResult};
use crate::id::{GraphId, TaskId};

type ExecuteFn = dyn Fn() + Send + Sync;

struct TaskInner {
    id: TaskId,
    dummy: bool,
    execute: Option<Box<ExecuteFn>>,
    in_edges: Vec<Task>,
    out_edges: Vec<Task>,
    satisfied_predecessors: usize,
    parent: Option<Weak<Mutex<GraphInner>>>,
}

/// A unit of work in a task graph.
///
/// Cheap to clone: every clone addresses the same underlying task, the
/// way cloning an `Arc` does. Two handles are the same task iff
/// [`Task::id`] compares equal.
#[derive(Clone)]
pub struct Task(Arc<Mutex<TaskInner>>);

impl Task {
    /// A task that runs nothing observable; used internally as an entry
    /// or exit sentinel for a [`TaskGraph`]. Sentinels never consume a
    /// worker slot (see the executor).
    fn new_dummy() -> Self {
        Task(Arc::new(Mutex::new(TaskInner {
            id: TaskId::next(),
            dummy: true,
            execute: None,
            in_edges: Vec::new(),
            out_edges: Vec::new(),
            satisfied_predecessors: 0,
            parent: None,
        })))
    }

    /// A task with no work attached. Running it is a no-op; useful as a
    /// join point with no behavior of its own.
    pub fn new() -> Self {
        Task(Arc::new(Mutex::new(TaskInner {
            id: TaskId::next(),
            dummy: false,
            execute: None,
            in_edges: Vec::new(),
            out_edges: Vec::new(),
            satisfied_predecessors: 0,
            parent: None,
        })))
    }

    /// A task that runs `f` when the executor dispatches it.
    pub fn with_execute(f: impl Fn() + Send + Sync + 'static) -> Self {
        Task(Arc::new(Mutex::new(TaskInner {
            id: TaskId::next(),
            dummy: false,
            execute: Some(Box::new(f)),
            in_edges: Vec::new(),
            out_edges: Vec::new(),
            satisfied_predecessors: 0,
            parent: None,
        })))
    }

    /// Attach (or replace) the work this task runs when dispatched.
    pub fn set_execute(&self, f: impl Fn() + Send + Sync + 'static) {
        self.0.lock().unwrap().execute = Some(Box::new(f));
    }

    /// This task's stable identity.
    pub fn id(&self) -> TaskId {
        self.0.lock().unwrap().id
    }

    /// Whether this is a sentinel with no user-visible work.
    pub fn is_dummy(&self) -> bool {
        self.0.lock().unwrap().dummy
    }

    /// Invoke the attached work, if any. Sentinels and bare `Task::new()`
    /// tasks do nothing. Callers (the executor) never hold this task's
    /// own lock across `run`, so locking for the duration of the call is
    /// safe here.
    pub fn run(&self) {
        let inner = self.0.lock().unwrap();
        if let Some(ref exec) = inner.execute {
            exec();
        }
    }

    /// Number of predecessors whose completion this task has observed so
    /// far in the current execution pass.
    pub(crate) fn satisfied_predecessors(&self) -> usize {
        self.0.lock().unwrap().satisfied_predecessors
    }

    /// Total number of predecessors (`in_edges.len()`), i.e. the count
    /// `satisfied_predecessors` must reach before this task is ready.
    pub fn predecessor_count(&self) -> usize {
        self.0.lock().unwrap().in_edges.len()
    }

    /// Record that one predecessor has completed. Returns `true` if this
    /// was the last one, i.e. the task is now ready to run. Atomic: the
    /// per-task mutex serializes concurrent completions from different
    /// worker threads.
    pub fn notify_predecessor_done(&self) -> bool {
        let mut inner = self.0.lock().unwrap();
        inner.satisfied_predecessors += 1;
        inner.satisfied_predecessors == inner.in_edges.len()
    }

    /// Reset this task's per-pass completion counter to zero. Called by
    /// the executor before each `execute()` pass.
    pub fn reset_pass_state(&self) {
        self.0.lock().unwrap().satisfied_predecessors = 0;
    }

    pub fn out_edges(&self) -> Vec<Task> {
        self.0.lock().unwrap().out_edges.clone()
    }

    pub(crate) fn in_edges(&self) -> Vec<Task> {
        self.0.lock().unwrap().in_edges.clone()
    }

    fn has_out_edge_to(&self, to: &Task) -> bool {
        let to_id = to.id();
        self.0.lock().unwrap().out_edges.iter().any(|t| t.id() == to_id)
    }

    fn push_out_edge(&self, to: Task) {
        self.0.lock().unwrap().out_edges.push(to);
    }

    fn push_in_edge(&self, from: Task) {
        self.0.lock().unwrap().in_edges.push(from);
    }

    fn remove_out_edge(&self, to: &Task) {
        let to_id = to.id();
        self.0.lock().unwrap().out_edges.retain(|t| t.id() != to_id);
    }

    fn remove_in_edge(&self, from: &Task) {
        let from_id = from.id();
        self.0.lock().unwrap().in_edges.retain(|t| t.id() != from_id);
    }

    fn parent_weak(&self) -> Option<Weak<Mutex<GraphInner>>> {
        self.0.lock().unwrap().parent.clone()
    }

    fn set_parent(&self, parent: Weak<Mutex<GraphInner>>) {
        self.0.lock().unwrap().parent = Some(parent);
    }

    /// Add a dependency edge so that `other` will not become ready until
    /// this task (and every other predecessor of `other`) has completed.
    /// `other` may be a [`Task`] or a [`TaskGraph`]; either way the edge
    /// actually lands between sentinels per [`TaskElement`].
    ///
    /// Both endpoints must currently share the same immediate parent
    /// graph, or the call returns [`ParentingError::NoCommonParent`]
    /// without changing anything (this includes a task with no parent
    /// at all). If the edge would create a cycle it is rejected and the
    /// graph's edge set - including the spine edges this call
    /// speculatively removes - is restored exactly as it was.
    pub fn add_dependency_to<T: TaskElement>(&self, other: &T) -> TaskGraphResult<()> {
        let parent = common_parent(self, other)?;
        let spine = SpineEdges::task_to(self, other, &parent);
        retarget(self.exit_sentinel(), other.entry_sentinel(), spine)
    }

    fn common_parent_graph(&self) -> Option<TaskGraph> {
        self.parent_weak().and_then(|w| w.upgrade()).map(TaskGraph)
    }
}

impl Default for Task {
    fn default() -> Self {
        Task::new()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("id", &self.id()).finish()
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
impl Eq for Task {}

struct GraphInner {
    id: GraphId,
    start: Task,
    end: Task,
    members: Vec<Task>,
    subgraphs: Vec<TaskGraph>,
    parent: Option<Weak<Mutex<GraphInner>>>,
}

/// A container of tasks and nested sub-graphs forming one node of the
/// containment tree. A `TaskGraph`'s own `start`/`end` sentinels are what
/// dependency edges actually attach to when the other endpoint of
/// `add_dependency_to` is a graph rather than a bare task (see
/// [`TaskElement`]).
#[derive(Clone)]
pub struct TaskGraph(Arc<Mutex<GraphInner>>);

impl TaskGraph {
    /// An empty graph with fresh `start`/`end` sentinels already wired
    /// `start -> end`, no parent.
    pub fn new() -> Self {
        let start = Task::new_dummy();
        let end = Task::new_dummy();
        start.push_out_edge(end.clone());
        end.push_in_edge(start.clone());
        TaskGraph(Arc::new(Mutex::new(GraphInner {
            id: GraphId::next(),
            start,
            end,
            members: Vec::new(),
            subgraphs: Vec::new(),
            parent: None,
        })))
    }

    /// This graph's stable identity.
    pub fn id(&self) -> GraphId {
        self.0.lock().unwrap().id
    }

    /// Whether this graph currently has no members and no sub-graphs,
    /// i.e. `start` and `end` are the only two tasks it contains.
    fn is_empty_of_members(&self) -> bool {
        let inner = self.0.lock().unwrap();
        inner.members.is_empty() && inner.subgraphs.is_empty()
    }

    /// Drop the direct `start -> end` edge the very first time this
    /// graph gains a real member (task or sub-graph). Idempotent: a
    /// no-op if the edge is already gone.
    fn drop_direct_spine_if_first_member(&self) {
        let (start, end) = {
            let inner = self.0.lock().unwrap();
            (inner.start.clone(), inner.end.clone())
        };
        if start.has_out_edge_to(&end) {
            start.remove_out_edge(&end);
            end.remove_in_edge(&start);
        }
    }

    /// Attach `task` as a direct member of this graph. `task` must not
    /// already belong to another graph. On success, wires `start -> task`
    /// and `task -> end` (dropping the direct `start -> end` edge the
    /// first time this happens) so `start` and `end` stay the graph's
    /// single source and sink.
    pub fn add_task(&self, task: Task) -> TaskGraphResult<()> {
        if let Some(owner) = task.parent_weak().and_then(|w| w.upgrade()) {
            return Err(ParentingError::TaskAlreadyOwned {
                task: task.id(),
                owner: TaskGraph(owner).id(),
            }
            .into());
        }
        let was_empty = self.is_empty_of_members();
        task.set_parent(Arc::downgrade(&self.0));
        {
            let mut inner = self.0.lock().unwrap();
            inner.members.push(task.clone());
        }
        if was_empty {
            self.drop_direct_spine_if_first_member();
        }
        let (start, end) = (self.start(), self.end());
        start.push_out_edge(task.clone());
        task.push_in_edge(start);
        task.push_out_edge(end.clone());
        end.push_in_edge(task);
        Ok(())
    }

    /// Attach `sub` as a direct sub-graph of this graph. `sub` must not
    /// already have a parent, and must not be this graph itself. On
    /// success, wires `start -> sub.start` and `sub.end -> end` the same
    /// way [`TaskGraph::add_task`] wires a bare task - only `sub`'s own
    /// sentinels participate in this graph's edge set, never `sub`'s
    /// members directly.
    pub fn add_subgraph(&self, sub: TaskGraph) -> TaskGraphResult<()> {
        if sub.id() == self.id() {
            return Err(ParentingError::GraphIsSelf { graph: self.id() }.into());
        }
        if let Some(owner) = sub.parent_graph() {
            return Err(ParentingError::GraphAlreadyOwned {
                graph: sub.id(),
                owner: owner.id(),
            }
            .into());
        }
        let was_empty = self.is_empty_of_members();
        sub.set_parent(Arc::downgrade(&self.0));
        {
            let mut inner = self.0.lock().unwrap();
            inner.subgraphs.push(sub.clone());
        }
        if was_empty {
            self.drop_direct_spine_if_first_member();
        }
        let (start, end) = (self.start(), self.end());
        let (sub_start, sub_end) = (sub.start(), sub.end());
        start.push_out_edge(sub_start.clone());
        sub_start.push_in_edge(start);
        sub_end.push_out_edge(end.clone());
        end.push_in_edge(sub_end);
        Ok(())
    }

    /// Add a dependency edge from this graph to `other`: from this
    /// graph's `end` sentinel to `other`'s entry sentinel (`other.start`
    /// if `other` is a graph, `other` itself if it's a bare task). `self`
    /// and `other` must be distinct elements sharing the same immediate
    /// parent graph.
    pub fn add_dependency_to<T: TaskElement>(&self, other: &T) -> TaskGraphResult<()> {
        if let Some(other_id) = other.as_graph_id() {
            if other_id == self.id() {
                return Err(ParentingError::GraphIsSelf { graph: self.id() }.into());
            }
        }
        let parent = common_parent(self, other)?;
        let spine = SpineEdges::graph_to(self, other, &parent);
        retarget(self.exit_sentinel(), other.entry_sentinel(), spine)
    }

    fn set_parent(&self, parent: Weak<Mutex<GraphInner>>) {
        self.0.lock().unwrap().parent = Some(parent);
    }

    fn parent_weak(&self) -> Option<Weak<Mutex<GraphInner>>> {
        self.0.lock().unwrap().parent.clone()
    }

    fn common_parent_graph(&self) -> Option<TaskGraph> {
        self.parent_weak().and_then(|w| w.upgrade()).map(TaskGraph)
    }

    /// This graph's entry sentinel.
    pub fn start(&self) -> Task {
        self.0.lock().unwrap().start.clone()
    }

    /// This graph's exit sentinel. The executor treats dequeuing the
    /// root graph's `end` as the signal that execution is complete.
    pub fn end(&self) -> Task {
        self.0.lock().unwrap().end.clone()
    }

    /// Directly owned member tasks, not including sentinels or the
    /// contents of sub-graphs.
    pub fn members(&self) -> Vec<Task> {
        self.0.lock().unwrap().members.clone()
    }

    /// Directly owned sub-graphs.
    pub fn subgraphs(&self) -> Vec<TaskGraph> {
        self.0.lock().unwrap().subgraphs.clone()
    }

    /// The graph that owns this one, if any.
    pub fn parent_graph(&self) -> Option<TaskGraph> {
        self.common_parent_graph()
    }

    /// All member tasks reachable from this graph, including those
    /// nested in sub-graphs, but not counting `start`/`end` sentinels.
    /// Used by the executor to reset per-pass state before a run.
    pub fn all_member_tasks(&self) -> Vec<Task> {
        let mut out = self.members();
        for sub in self.subgraphs() {
            out.push(sub.start());
            out.push(sub.end());
            out.extend(sub.all_member_tasks());
        }
        out
    }
}

impl Default for TaskGraph {
    fn default() -> Self {
        TaskGraph::new()
    }
}

impl fmt::Debug for TaskGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGraph").field("id", &self.id()).finish()
    }
}

impl PartialEq for TaskGraph {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
impl Eq for TaskGraph {}

/// Common behavior of the two things a dependency edge can attach to:
/// a bare [`Task`], or a [`TaskGraph`] acting through its `start`/`end`
/// sentinels. Lets `add_dependency_to` be written once per endpoint type
/// instead of overloaded per combination, the way the original's C++
/// signature overloads required four separate bodies.
pub trait TaskElement {
    /// The sentinel an incoming edge should actually attach to: the task
    /// itself for a [`Task`], or the graph's `start` for a [`TaskGraph`].
    fn entry_sentinel(&self) -> Task;

    /// The sentinel an outgoing edge should actually originate from: the
    /// task itself for a [`Task`], or the graph's `end` for a
    /// [`TaskGraph`].
    fn exit_sentinel(&self) -> Task;

    /// The immediate parent graph of this element, if any.
    fn parent_graph(&self) -> Option<TaskGraph>;

    /// `Some(id)` if this element is itself a `TaskGraph`; used only to
    /// detect the graph-depends-on-itself case, which is a parenting
    /// error rather than falling through to cycle detection (unlike a
    /// task depending on itself, which is always a cycle).
    fn as_graph_id(&self) -> Option<GraphId> {
        None
    }
}

impl TaskElement for Task {
    fn entry_sentinel(&self) -> Task {
        self.clone()
    }
    fn exit_sentinel(&self) -> Task {
        self.clone()
    }
    fn parent_graph(&self) -> Option<TaskGraph> {
        self.common_parent_graph()
    }
}

impl TaskElement for TaskGraph {
    fn entry_sentinel(&self) -> Task {
        self.start()
    }
    fn exit_sentinel(&self) -> Task {
        self.end()
    }
    fn parent_graph(&self) -> Option<TaskGraph> {
        self.common_parent_graph()
    }
    fn as_graph_id(&self) -> Option<GraphId> {
        Some(self.id())
    }
}

fn common_parent<A: TaskElement, B: TaskElement>(a: &A, b: &B) -> TaskGraphResult<TaskGraph> {
    match (a.parent_graph(), b.parent_graph()) {
        (Some(pa), Some(pb)) if pa.id() == pb.id() => Ok(pa),
        _ => Err(ParentingError::NoCommonParent.into()),
    }
}

/// The two "spine" edges a candidate dependency can make redundant, and
/// whether each was actually present before the call. `a -> b` making
/// `P.start -> b` or `a -> P.end` redundant: once `a` reaches `b`
/// directly, the spine no longer needs to route through it for
/// reachability from `start` or to `end`.
struct SpineEdges {
    /// `P.start -> to`, removed because `to` will now be reached via the
    /// new edge instead of directly from the graph's entry sentinel.
    start_to_target: Option<(Task, Task)>,
    /// `from -> P.end`, removed because `from` now has a real successor
    /// instead of draining straight to the graph's exit sentinel.
    source_to_end: Option<(Task, Task)>,
}

impl SpineEdges {
    /// Spine edges touched by `task.add_dependency_to(other)`.
    fn task_to<T: TaskElement>(task: &Task, other: &T, parent: &TaskGraph) -> Self {
        let p_start = parent.start();
        let p_end = parent.end();
        let to = other.entry_sentinel();
        SpineEdges {
            start_to_target: Some((p_start, to)),
            source_to_end: Some((task.clone(), p_end)),
        }
    }

    /// Spine edges touched by `graph.add_dependency_to(other)`.
    fn graph_to<T: TaskElement>(graph: &TaskGraph, other: &T, parent: &TaskGraph) -> Self {
        let p_start = parent.start();
        let p_end = parent.end();
        let to = other.entry_sentinel();
        SpineEdges {
            start_to_target: Some((p_start, to)),
            source_to_end: Some((graph.end(), p_end)),
        }
    }

    fn remove_present(&mut self) {
        if let Some((from, to)) = &self.start_to_target {
            if from.has_out_edge_to(to) {
                from.remove_out_edge(to);
                to.remove_in_edge(from);
            } else {
                self.start_to_target = None;
            }
        }
        if let Some((from, to)) = &self.source_to_end {
            if from.has_out_edge_to(to) {
                from.remove_out_edge(to);
                to.remove_in_edge(from);
            } else {
                self.source_to_end = None;
            }
        }
    }

    fn restore(&self) {
        if let Some((from, to)) = &self.start_to_target {
            from.push_out_edge(to.clone());
            to.push_in_edge(from.clone());
        }
        if let Some((from, to)) = &self.source_to_end {
            from.push_out_edge(to.clone());
            to.push_in_edge(from.clone());
        }
    }
}

/// Try to add the edge `from -> to`, after first speculatively removing
/// whichever of `spine`'s two edges are actually present. If the new
/// edge would create a cycle - including the degenerate case of a task
/// depending on itself - every removed spine edge is restored, the new
/// edge is not added, and [`CycleError`] is returned. On success the
/// spine edges that were redundant stay gone.
fn retarget(from: Task, to: Task, mut spine: SpineEdges) -> TaskGraphResult<()> {
    spine.remove_present();

    if from.id() == to.id() {
        spine.restore();
        return Err(TaskGraphError::from(CycleError::new(from.id(), to.id())));
    }

    // A direct edge between these two may already exist (a repeat
    // `add_dependency_to` call between the same pair); drop it first so
    // re-adding below never produces a duplicate.
    if from.has_out_edge_to(&to) {
        from.remove_out_edge(&to);
        to.remove_in_edge(&from);
    }

    from.push_out_edge(to.clone());
    to.push_in_edge(from.clone());

    if creates_cycle(&from) {
        from.remove_out_edge(&to);
        to.remove_in_edge(&from);
        spine.restore();
        return Err(TaskGraphError::from(CycleError::new(from.id(), to.id())));
    }

    Ok(())
}

/// Whether the graph reachable from `start` following `out_edges`
/// contains a cycle. Plain DFS with a visited set; called once per
/// tentative edge addition, after the edge is already in place, so a
/// cycle shows up as `start` being reachable from itself.
fn creates_cycle(start: &Task) -> bool {
    let mut stack = start.out_edges();
    let mut visited = std::collections::HashSet::new();
    while let Some(t) = stack.pop() {
        if t.id() == start.id() {
            return true;
        }
        if !visited.insert(t.id()) {
            continue;
        }
        stack.extend(t.out_edges());
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn new_graph_has_start_wired_to_end() {
        let g = TaskGraph::new();
        assert_eq!(g.start().out_edges().len(), 1);
        assert_eq!(g.start().out_edges()[0].id(), g.end().id());
    }

    #[test]
    fn add_task_sets_parent() {
        let g = TaskGraph::new();
        let t = Task::new();
        g.add_task(t.clone()).unwrap();
        assert_eq!(t.parent_graph().unwrap().id(), g.id());
    }

    #[test]
    fn add_task_drops_direct_spine_and_wires_sentinels() {
        let g = TaskGraph::new();
        let t = Task::new();
        g.add_task(t.clone()).unwrap();
        assert!(!g.start().has_out_edge_to(&g.end()));
        assert!(g.start().out_edges().iter().any(|x| x.id() == t.id()));
        assert!(t.out_edges().iter().any(|x| x.id() == g.end().id()));
        assert_eq!(t.predecessor_count(), 1);
    }

    #[test]
    fn second_task_does_not_reintroduce_direct_spine() {
        let g = TaskGraph::new();
        let a = Task::new();
        let b = Task::new();
        g.add_task(a.clone()).unwrap();
        g.add_task(b.clone()).unwrap();
        assert!(!g.start().has_out_edge_to(&g.end()));
        assert_eq!(g.start().out_edges().len(), 2);
        assert_eq!(g.end().in_edges().len(), 2);
    }

    #[test]
    fn add_task_twice_is_rejected() {
        let g = TaskGraph::new();
        let t = Task::new();
        g.add_task(t.clone()).unwrap();
        let g2 = TaskGraph::new();
        let err = g2.add_task(t).unwrap_err();
        assert!(matches!(
            err,
            TaskGraphError::Parenting(ParentingError::TaskAlreadyOwned { .. })
        ));
    }

    #[test]
    fn task_depends_on_itself_is_a_cycle() {
        let g = TaskGraph::new();
        let t = Task::new();
        g.add_task(t.clone()).unwrap();
        let err = t.add_dependency_to(&t).unwrap_err();
        assert!(matches!(err, TaskGraphError::Cycle(_)));
        // self-dependency attempt touched nothing
        assert!(t.out_edges().iter().any(|x| x.id() == g.end().id()));
        assert!(g.start().out_edges().iter().any(|x| x.id() == t.id()));
    }

    #[test]
    fn graph_depends_on_itself_is_a_parenting_error() {
        let root = TaskGraph::new();
        let sub = TaskGraph::new();
        root.add_subgraph(sub.clone()).unwrap();
        let err = sub.add_dependency_to(&sub).unwrap_err();
        assert!(matches!(
            err,
            TaskGraphError::Parenting(ParentingError::GraphIsSelf { .. })
        ));
    }

    #[test]
    fn direct_dependency_drops_redundant_spine_edges() {
        let g = TaskGraph::new();
        let a = Task::new();
        let b = Task::new();
        g.add_task(a.clone()).unwrap();
        g.add_task(b.clone()).unwrap();
        a.add_dependency_to(&b).unwrap();

        // a -> g.end is gone (a now has a real successor)
        assert!(!a.out_edges().iter().any(|x| x.id() == g.end().id()));
        // g.start -> b is gone (b is now reached via a)
        assert!(!g.start().out_edges().iter().any(|x| x.id() == b.id()));
        // the new edge exists
        assert!(a.out_edges().iter().any(|x| x.id() == b.id()));
        assert_eq!(b.predecessor_count(), 1);
    }

    #[test]
    fn direct_cycle_between_two_tasks_is_rejected() {
        let g = TaskGraph::new();
        let a = Task::new();
        let b = Task::new();
        g.add_task(a.clone()).unwrap();
        g.add_task(b.clone()).unwrap();
        a.add_dependency_to(&b).unwrap();
        let err = b.add_dependency_to(&a).unwrap_err();
        assert!(matches!(err, TaskGraphError::Cycle(_)));
        // rollback restored b's spine edges exactly
        assert!(b.out_edges().iter().any(|x| x.id() == g.end().id()));
        assert!(!b.out_edges().iter().any(|x| x.id() == a.id()));
    }

    #[test]
    fn three_cycle_rejection_leaves_path_intact() {
        // T1->T2, T2->T3, T3->T1 rejected; the two-edge path
        // T1->T2->T3 survives untouched.
        let g = TaskGraph::new();
        let t1 = Task::new();
        let t2 = Task::new();
        let t3 = Task::new();
        g.add_task(t1.clone()).unwrap();
        g.add_task(t2.clone()).unwrap();
        g.add_task(t3.clone()).unwrap();
        t1.add_dependency_to(&t2).unwrap();
        t2.add_dependency_to(&t3).unwrap();
        let err = t3.add_dependency_to(&t1).unwrap_err();
        assert!(matches!(err, TaskGraphError::Cycle(_)));

        assert!(t1.out_edges().iter().any(|x| x.id() == t2.id()));
        assert!(t2.out_edges().iter().any(|x| x.id() == t3.id()));
        assert_eq!(t1.out_edges().len(), 1);
        assert_eq!(t2.out_edges().len(), 1);
        // t3's spine restored: it still only drains to g.end
        assert!(t3.out_edges().iter().any(|x| x.id() == g.end().id()));
        assert_eq!(t3.out_edges().len(), 1);
    }

    #[test]
    fn dependency_between_elements_without_common_parent_is_rejected() {
        let g1 = TaskGraph::new();
        let g2 = TaskGraph::new();
        let a = Task::new();
        let b = Task::new();
        g1.add_task(a.clone()).unwrap();
        g2.add_task(b.clone()).unwrap();
        let err = a.add_dependency_to(&b).unwrap_err();
        assert!(matches!(
            err,
            TaskGraphError::Parenting(ParentingError::NoCommonParent)
        ));
    }

    #[test]
    fn parentless_task_dependency_is_rejected() {
        let a = Task::new();
        let b = Task::new();
        let err = a.add_dependency_to(&b).unwrap_err();
        assert!(matches!(
            err,
            TaskGraphError::Parenting(ParentingError::NoCommonParent)
        ));
    }

    #[test]
    fn parentless_task_depending_on_itself_is_a_parenting_error() {
        // A parentless task always fails the common-parent check first,
        // uniformly as ParentingError, rather than special-casing
        // self-dependency above it.
        let a = Task::new();
        let err = a.add_dependency_to(&a).unwrap_err();
        assert!(matches!(
            err,
            TaskGraphError::Parenting(ParentingError::NoCommonParent)
        ));
    }

    #[test]
    fn subgraph_dependency_attaches_to_sentinels() {
        let root = TaskGraph::new();
        let a = TaskGraph::new();
        let b = TaskGraph::new();
        root.add_subgraph(a.clone()).unwrap();
        root.add_subgraph(b.clone()).unwrap();
        a.add_dependency_to(&b).unwrap();
        assert!(a.end().out_edges().iter().any(|t| t.id() == b.start().id()));
        // redundant spine removed: root.start no longer points at b.start
        assert!(!root.start().out_edges().iter().any(|t| t.id() == b.start().id()));
    }

    #[test]
    fn predecessor_counting_notifies_on_last_completion() {
        let g = TaskGraph::new();
        let a = Task::new();
        let b = Task::new();
        let c = Task::new();
        g.add_task(a.clone()).unwrap();
        g.add_task(b.clone()).unwrap();
        g.add_task(c.clone()).unwrap();
        a.add_dependency_to(&c).unwrap();
        b.add_dependency_to(&c).unwrap();
        assert_eq!(c.predecessor_count(), 2);
        assert!(!c.notify_predecessor_done());
        assert!(c.notify_predecessor_done());
    }

    #[test]
    fn task_run_invokes_attached_closure() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c2 = counter.clone();
        let t = Task::with_execute(move || {
            c2.fetch_add(1, Ordering::SeqCst);
        });
        t.run();
        t.run();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dummy_task_run_is_a_no_op() {
        let g = TaskGraph::new();
        g.start().run();
        assert!(g.start().is_dummy());
    }

    #[test]
    fn all_member_tasks_includes_subgraph_contents() {
        let root = TaskGraph::new();
        let sub = TaskGraph::new();
        let leaf = Task::new();
        sub.add_task(leaf.clone()).unwrap();
        root.add_subgraph(sub.clone()).unwrap();
        let t = Task::new();
        root.add_task(t.clone()).unwrap();

        let all = root.all_member_tasks();
        assert!(all.iter().any(|x| x.id() == t.id()));
        assert!(all.iter().any(|x| x.id() == sub.start().id()));
        assert!(all.iter().any(|x| x.id() == sub.end().id()));
        assert!(all.iter().any(|x| x.id() == leaf.id()));
    }
}
