//! Depth-first walk along the execution path of one function.

use crate::domain::trace::{NodeIndex, Trace, TraceNode};
use std::collections::{HashSet, VecDeque};

/// Walks the children of a function, expanding only the selected loop
/// iterations.
///
/// Nested functions are reported but not entered. A loop iteration is
/// expanded only if it is the head of the remaining selection; expanding it
/// consumes the head and puts its base trace id in the skip set, which prunes
/// every other iteration of that loop met later in the walk. All state lives
/// in the walker, so each resolver call starts from scratch.
pub(crate) struct PathWalker<'a> {
    trace: &'a Trace,
    selection: VecDeque<NodeIndex>,
    skip: HashSet<&'a str>,
}

impl<'a> PathWalker<'a> {
    pub(crate) fn new(trace: &'a Trace, selection: &[NodeIndex]) -> Self {
        Self {
            trace,
            selection: selection.iter().copied().collect(),
            skip: HashSet::new(),
        }
    }

    /// Call `on_node` for every node on the path below `function`, in
    /// depth-first child order.
    pub(crate) fn walk<F>(mut self, function: NodeIndex, on_node: &mut F)
    where
        F: FnMut(&'a TraceNode),
    {
        let trace = self.trace;
        for &child in &trace.nodes()[function].children {
            self.visit(child, on_node);
        }
    }

    fn visit<F>(&mut self, index: NodeIndex, on_node: &mut F)
    where
        F: FnMut(&'a TraceNode),
    {
        let trace = self.trace;
        let node = &trace.nodes()[index];
        if self.skip.contains(node.base_trace_id()) {
            return;
        }
        if node.is_function() {
            on_node(node);
            return;
        }
        if node.is_loop() {
            if self.selection.front() != Some(&index) {
                return;
            }
            self.selection.pop_front();
            self.skip.insert(node.base_trace_id());
        }

        on_node(node);
        for &child in &node.children {
            self.visit(child, on_node);
        }
    }
}
