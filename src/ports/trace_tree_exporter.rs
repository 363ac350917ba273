//! Trace Tree DOT Exporter
//!
//! Exports the trace tree of one function as Graphviz DOT, with the nodes on
//! the active path filled and every other recorded node greyed out.

use crate::domain::record::NodeType;
use crate::domain::trace::{NodeIndex, Trace, TraceNode};
use crate::domain::view::View;
use crate::ports::ViewExporter;
use std::collections::HashSet;
use std::io::Result;

pub struct TraceTreeExporter;

impl ViewExporter for TraceTreeExporter {
    fn export(&self, trace: &Trace, view: &View, path: &str) -> Result<()> {
        std::fs::write(path, Self::to_dot(trace, view))
    }
}

impl TraceTreeExporter {
    /// Convert the function's subtree to a DOT string.
    ///
    /// Nested calls appear as leaves; their bodies belong to their own view.
    pub fn to_dot(trace: &Trace, view: &View) -> String {
        let active: HashSet<NodeIndex> = trace
            .active_nodes(view.function, &view.iterations)
            .into_iter()
            .collect();
        let mut lines = Vec::new();

        lines.push("digraph TraceTree {".to_string());
        lines.push("    rankdir=TB;".to_string());
        lines.push("    nodesep=0.6;".to_string());
        lines.push("    node [fontname=\"Helvetica\", fontsize=12];".to_string());
        lines.push("    edge [fontname=\"Helvetica\", fontsize=10];".to_string());
        lines.push("".to_string());

        let Some(root) = trace.node(view.function) else {
            lines.push("}".to_string());
            return lines.join("\n");
        };

        let mut stack = vec![root];
        let mut edges = Vec::new();
        while let Some(node) = stack.pop() {
            let is_active = active.contains(&node.index);
            let (shape, color) = Self::node_style(node.node_type);
            let style = if is_active { "filled" } else { "dashed" };
            let fill = if is_active { color } else { "#e6e9ef" };
            lines.push(format!(
                "    n{} [label=\"{}\", shape={}, style=\"{}\", fillcolor=\"{}\"];",
                node.index,
                Self::escape_label(&Self::label(node)),
                shape,
                style,
                fill
            ));

            if node.is_function() && node.index != view.function {
                continue;
            }
            for &child in node.children.iter().rev() {
                edges.push((node.index, child));
                stack.push(&trace.nodes()[child]);
            }
        }

        lines.push("".to_string());
        // Children were pushed in reverse for the DFS; restore child order.
        edges.sort();
        for (from, to) in edges {
            lines.push(format!("    n{} -> n{};", from, to));
        }
        lines.push("}".to_string());

        lines.join("\n")
    }

    fn label(node: &TraceNode) -> String {
        match (node.node_type, node.method_name.as_deref()) {
            (NodeType::Function, Some(name)) => format!("{}: {}", node.index, name),
            (NodeType::Loop, _) => format!("{}: {} #{}", node.index, node.base_trace_id(), node.iteration),
            _ => format!("{}: {}", node.index, node.trace_id),
        }
    }

    fn node_style(node_type: NodeType) -> (&'static str, &'static str) {
        match node_type {
            NodeType::Function => ("box", "#89b4fa"),      // Blue
            NodeType::Loop => ("hexagon", "#cba6f7"),      // Purple
            NodeType::Throw => ("octagon", "#f38ba8"),     // Red
            NodeType::Statement => ("ellipse", "#a6e3a1"), // Green
        }
    }

    fn escape_label(label: &str) -> String {
        label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing::TraceBuilder;
    use crate::domain::trace::MAIN_INDEX;

    #[test]
    fn test_to_dot() {
        let mut b = TraceBuilder::new();
        let l1 = b.loop_iteration(MAIN_INDEX, "loop3", 1, 3);
        let l2 = b.loop_iteration(MAIN_INDEX, "loop3", 2, 3);
        let call = b.function(l1, "call4", 4);
        let hidden = b.statement(call, 40);
        let trace = b.build();

        let view = trace.view(MAIN_INDEX, &[l1], None);
        let dot = TraceTreeExporter::to_dot(&trace, &view);

        assert!(dot.contains("digraph TraceTree"));
        assert!(dot.contains(&format!("n{} [label=\"{}: loop3 #1\", shape=hexagon, style=\"filled\"", l1, l1)));
        assert!(dot.contains(&format!("n{} [label=\"{}: loop3 #2\", shape=hexagon, style=\"dashed\"", l2, l2)));
        assert!(dot.contains(&format!("n{} [label=\"{}: call4\", shape=box, style=\"filled\"", call, call)));
        assert!(dot.contains(&format!("n{} -> n{};", MAIN_INDEX, l1)));
        assert!(!dot.contains(&format!("n{} ", hidden)));
    }
}
