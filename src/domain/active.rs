//! Source ranges on the active execution path.

use crate::domain::range::Range;
use crate::domain::trace::{NodeIndex, Trace};
use crate::domain::walk::PathWalker;

impl Trace {
    /// Ranges executed by `function` under the given iteration selection,
    /// sorted by start line.
    ///
    /// Nested calls contribute only their call-site link. Returns nothing if
    /// `function` is not a Function node or the selection refers to nodes
    /// outside the trace.
    pub fn active_ranges(&self, function: NodeIndex, selection: &[NodeIndex]) -> Vec<Range> {
        if !self.is_valid_selection(function, selection) {
            return Vec::new();
        }

        let mut ranges: Vec<Range> = self.nodes()[function].ranges.clone();
        PathWalker::new(self, selection).walk(function, &mut |node| {
            if node.is_function() {
                ranges.extend(node.link_range().copied());
            } else {
                ranges.extend_from_slice(&node.ranges);
            }
        });

        // Stable: equal start lines keep walk order.
        ranges.sort_by_key(|r| r.start_line);
        ranges
    }

    /// Nodes on the active path: `function` first, then every node the
    /// walk reaches, in walk order.
    pub fn active_nodes(&self, function: NodeIndex, selection: &[NodeIndex]) -> Vec<NodeIndex> {
        if !self.is_valid_selection(function, selection) {
            return Vec::new();
        }

        let mut nodes = vec![function];
        PathWalker::new(self, selection).walk(function, &mut |node| nodes.push(node.index));
        nodes
    }
}
