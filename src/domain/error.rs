//! Errors raised while loading a trace.

use crate::domain::trace::NodeIndex;

/// A trace that cannot be navigated.
///
/// Everything except [`TraceError::Parse`] is a structural error: the records
/// parsed fine but do not form a usable tree, and the whole trace is rejected.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("Invalid trace JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Trace has no entry point (expected a Function node at index 1)")]
    Empty,
    #[error("Node 1 must be the entry Function, found {0}")]
    RootNotFunction(&'static str),
    #[error("Node {0} has no parent")]
    MissingParent(NodeIndex),
    #[error("Node {node} refers to parent {parent}, which is out of range")]
    ParentOutOfRange { node: NodeIndex, parent: i64 },
    #[error("Node {node} lists child {child}, which is out of range")]
    ChildOutOfRange { node: NodeIndex, child: i64 },
    #[error("Node {child} is listed as a child of {listed_by} but its parent is {parent}")]
    ChildParentMismatch {
        child: NodeIndex,
        listed_by: NodeIndex,
        parent: NodeIndex,
    },
    #[error("Cycle in parent chain starting at node {0}")]
    Cycle(NodeIndex),
    #[error("{kind} node {node} has no out index")]
    MissingOutIndex { node: NodeIndex, kind: &'static str },
    #[error("Node {node} has out index {out}, which is out of range")]
    OutIndexOutOfRange { node: NodeIndex, out: i64 },
    #[error("Walk from node {0} never reached an enclosing Function")]
    NoEnclosingFunction(NodeIndex),
}

impl TraceError {
    /// True for malformed-tree errors, as opposed to unreadable input.
    pub fn is_structural(&self) -> bool {
        !matches!(self, TraceError::Parse(_))
    }
}
