//! Error types for the task-graph model.

use core::fmt;

use crate::id::{GraphId, TaskId};

/// Result type for structural graph operations.
pub type TaskGraphResult<T> = Result<T, TaskGraphError>;

/// The two error kinds the graph model reports, both raised synchronously
/// from structural operations. Neither corrupts state: after either is
/// returned, the graph is exactly as it was before the call (see
/// [`CycleError`] and [`ParentingError`] for the precise rollback
/// guarantees).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskGraphError {
    /// `add_dependency_to` would have introduced a cycle. The offending
    /// edge was not added.
    Cycle(CycleError),
    /// An operation violated an ownership invariant.
    Parenting(ParentingError),
}

impl fmt::Display for TaskGraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskGraphError::Cycle(e) => write!(f, "{}", e),
            TaskGraphError::Parenting(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TaskGraphError {}

impl From<CycleError> for TaskGraphError {
    fn from(e: CycleError) -> Self {
        TaskGraphError::Cycle(e)
    }
}

impl From<ParentingError> for TaskGraphError {
    fn from(e: ParentingError) -> Self {
        TaskGraphError::Parenting(e)
    }
}

/// A candidate dependency edge `from -> to` was rejected because `from`
/// was reachable from `to` through existing forward edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleError {
    pub from: TaskId,
    pub to: TaskId,
}

impl CycleError {
    pub(crate) fn new(from: TaskId, to: TaskId) -> Self {
        CycleError { from, to }
    }
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dependency {} -> {} would introduce a cycle; edge rejected",
            self.from, self.to
        )
    }
}

impl std::error::Error for CycleError {}

/// An operation violated an ownership invariant of the graph model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentingError {
    /// `TaskGraph::add_task` on a task that already has an owning graph.
    TaskAlreadyOwned { task: TaskId, owner: GraphId },
    /// `TaskGraph::add_subgraph` on a graph that already has a parent.
    GraphAlreadyOwned { graph: GraphId, owner: GraphId },
    /// `TaskGraph::add_subgraph(g)` where `g` is the host graph itself, or
    /// `TaskGraph::add_dependency_to` between a graph and itself.
    GraphIsSelf { graph: GraphId },
    /// `add_dependency_to` between two elements that do not share an
    /// immediate parent graph (including a parentless element).
    NoCommonParent,
}

impl fmt::Display for ParentingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentingError::TaskAlreadyOwned { task, owner } => {
                write!(f, "task {} is already owned by graph {}", task, owner)
            }
            ParentingError::GraphAlreadyOwned { graph, owner } => {
                write!(f, "graph {} is already parented under graph {}", graph, owner)
            }
            ParentingError::GraphIsSelf { graph } => {
                write!(f, "graph {} cannot be its own subgraph or dependency target", graph)
            }
            ParentingError::NoCommonParent => {
                write!(f, "dependency endpoints do not share a common immediate parent")
            }
        }
    }
}

impl std::error::Error for ParentingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_cycle_error() {
        let a = TaskId::next();
        let b = TaskId::next();
        let e = CycleError::new(a, b);
        assert!(format!("{}", e).contains("would introduce a cycle"));
    }

    #[test]
    fn error_conversion() {
        let p = ParentingError::NoCommonParent;
        let e: TaskGraphError = p.into();
        assert!(matches!(e, TaskGraphError::Parenting(ParentingError::NoCommonParent)));
    }
}
