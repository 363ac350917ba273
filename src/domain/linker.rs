//! Cross-references between call/throw sites and where control resumes.
//!
//! Runs once per trace, right after validation. For every Function and
//! Throw node it walks the ancestor chain from the node's out index up to
//! the first enclosing Function, collecting the loop iterations that must
//! be active there for the highlighted path to line up with the place
//! control went to.

use crate::domain::error::TraceError;
use crate::domain::range::Position;
use crate::domain::record::NodeType;
use crate::domain::trace::{NodeIndex, TraceNode, MAIN_INDEX};

/// Fill in the derived fields of every Function and Throw node.
///
/// `max_depth` is the depth of the deepest node below the root; no valid
/// walk takes more than `max_depth + 1` steps.
pub fn link(nodes: &mut [TraceNode], max_depth: usize) -> Result<(), TraceError> {
    let mut linked = 0usize;

    for index in MAIN_INDEX + 1..nodes.len() {
        let node = &nodes[index];
        let (link_position, out_link_position) = match node.node_type {
            NodeType::Throw => {
                let handler = node.out_index.ok_or(TraceError::MissingOutIndex {
                    node: index,
                    kind: NodeType::Throw.as_str(),
                })?;
                (None, Some(handler_position(&nodes[handler])))
            }
            NodeType::Function => {
                if !matches!(node.out_links.len(), 1 | 2) {
                    tracing::warn!(
                        "[Linker] Function node {} has {} out links; expected 1 or 2",
                        index,
                        node.out_links.len()
                    );
                }
                (
                    node.out_links.last().map(|l| l.range.start()),
                    node.link_range().map(|r| r.start()),
                )
            }
            NodeType::Loop | NodeType::Statement => continue,
        };

        let start = node.out_index.ok_or(TraceError::NoEnclosingFunction(index))?;
        let (function, loops) = return_context(nodes, index, start, max_depth)?;

        let node = &mut nodes[index];
        node.link_position = link_position;
        node.out_link_position = out_link_position;
        node.out_function_index = Some(function);
        node.out_loop_iterations = loops;
        linked += 1;
    }

    tracing::debug!("[Linker] Linked {} call/throw nodes", linked);
    Ok(())
}

/// Start of the handler's topmost range, or the zero position when the
/// handler recorded no ranges (e.g. an empty catch block).
fn handler_position(handler: &TraceNode) -> Position {
    handler
        .ranges
        .iter()
        .min_by_key(|r| r.start_line)
        .map_or(Position::ZERO, |r| r.start())
}

/// Walk up from `start` to the first Function, returning it together with
/// the loop iterations to activate inside it.
///
/// At every level the collected set is: the level's own node if it is a
/// loop, then, in child order, the set carried up from the level below (at
/// the child the walk came from) and every first iteration of a loop other
/// than the one the walk came through.
fn return_context(
    nodes: &[TraceNode],
    origin: NodeIndex,
    start: NodeIndex,
    max_depth: usize,
) -> Result<(NodeIndex, Vec<NodeIndex>), TraceError> {
    let mut cur = start;
    let mut prev: Option<NodeIndex> = None;
    let mut carried: Vec<NodeIndex> = Vec::new();

    for _ in 0..=max_depth + 1 {
        let node = &nodes[cur];
        let prev_base = prev.map(|p| nodes[p].base_trace_id());

        let mut level = Vec::new();
        if node.is_loop() {
            level.push(cur);
        }
        for &child in &node.children {
            let child_node = &nodes[child];
            if Some(child) == prev {
                level.append(&mut carried);
            } else if child_node.is_loop()
                && child_node.iteration == 1
                && Some(child_node.base_trace_id()) != prev_base
            {
                level.push(child);
            }
        }

        if node.is_function() {
            return Ok((cur, level));
        }
        prev = Some(cur);
        carried = level;
        cur = node.parent.ok_or(TraceError::NoEnclosingFunction(origin))?;
    }

    Err(TraceError::NoEnclosingFunction(origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing::TraceBuilder;
    use crate::domain::trace::Trace;

    #[test]
    fn test_call_in_second_iteration_returns_to_that_iteration() {
        let mut b = TraceBuilder::new();
        let l1 = b.loop_iteration(MAIN_INDEX, "loop3", 1, 3);
        let l2 = b.loop_iteration(MAIN_INDEX, "loop3", 2, 3);
        let other = b.loop_iteration(MAIN_INDEX, "loop8", 1, 8);
        let call = b.function(l2, "call4", 4);
        let trace = b.build();

        let node = trace.node(call).unwrap();
        assert_eq!(node.out_function_index, Some(MAIN_INDEX));
        // l2 is carried up; l1 is the same loop and is left out
        assert_eq!(node.out_loop_iterations, vec![l2, other]);
        assert!(!node.out_loop_iterations.contains(&l1));
    }

    #[test]
    fn test_nested_loops_are_carried_in_order() {
        let mut b = TraceBuilder::new();
        let outer1 = b.loop_iteration(MAIN_INDEX, "outer", 1, 3);
        let inner1 = b.loop_iteration(outer1, "inner", 1, 4);
        let inner2 = b.loop_iteration(outer1, "inner", 2, 4);
        let call = b.function(inner2, "call5", 5);
        let _ = inner1;
        let trace = b.build();

        let node = trace.node(call).unwrap();
        assert_eq!(node.out_function_index, Some(MAIN_INDEX));
        assert_eq!(node.out_loop_iterations, vec![outer1, inner2]);
    }

    #[test]
    fn test_throw_links_to_enclosing_function_of_handler() {
        let mut b = TraceBuilder::new();
        let helper = b.function(MAIN_INDEX, "call2", 2);
        let handler = b.statement(MAIN_INDEX, 6);
        let throw = b.throw(helper, handler, 12);
        let mut records = b.records();
        records[handler].ranges = vec![
            crate::domain::range::Range::new(9, 3, 9, 20),
            crate::domain::range::Range::new(7, 5, 8, 1),
            crate::domain::range::Range::new(7, 1, 7, 4),
        ];
        let trace = Trace::load(records).unwrap();

        let node = trace.node(throw).unwrap();
        assert_eq!(node.out_function_index, Some(MAIN_INDEX));
        assert_eq!(node.out_link_position, Some(Position::new(7, 5)));
        assert_eq!(node.link_position, None);
    }

    #[test]
    fn test_throw_to_empty_handler_uses_zero_position() {
        let mut b = TraceBuilder::new();
        let handler = b.statement(MAIN_INDEX, 6);
        let throw = b.throw(MAIN_INDEX, handler, 3);
        let mut records = b.records();
        records[handler].ranges.clear();
        let trace = Trace::load(records).unwrap();

        assert_eq!(trace.node(throw).unwrap().out_link_position, Some(Position::ZERO));
    }

    #[test]
    fn test_function_positions() {
        let mut b = TraceBuilder::new();
        let l1 = b.loop_iteration(MAIN_INDEX, "loop3", 1, 3);
        let call = b.function_in_loop(l1, "call4", 4, 30);
        let trace = b.build();

        let node = trace.node(call).unwrap();
        assert_eq!(node.link_position, Some(Position::new(30, 5)));
        assert_eq!(node.out_link_position, Some(Position::new(4, 5)));
    }

    #[test]
    fn test_unexpected_out_link_counts_still_link() {
        let mut b = TraceBuilder::new();
        let none = b.function(MAIN_INDEX, "call4", 4);
        let many = b.function_in_loop(MAIN_INDEX, "call8", 8, 30);
        let mut records = b.records();
        records[none].out_links.clear();
        records[many].out_links.push(crate::domain::range::SourceLink {
            file: "call8.java".to_string(),
            range: crate::domain::range::Range::new(60, 2, 60, 12),
        });
        let trace = Trace::load(records).unwrap();

        let node = trace.node(none).unwrap();
        assert_eq!(node.link_position, None);
        assert_eq!(node.out_link_position, Some(Position::new(4, 5)));
        assert_eq!(node.out_function_index, Some(MAIN_INDEX));

        let node = trace.node(many).unwrap();
        assert_eq!(node.out_links.len(), 3);
        assert_eq!(node.link_position, Some(Position::new(60, 2)));
        assert_eq!(node.out_function_index, Some(MAIN_INDEX));
    }

    #[test]
    fn test_every_out_function_is_a_function() {
        let mut b = TraceBuilder::new();
        let l1 = b.loop_iteration(MAIN_INDEX, "loop3", 1, 3);
        let helper = b.function(l1, "call4", 4);
        let l2 = b.loop_iteration(helper, "loop20", 1, 20);
        let handler = b.statement(helper, 25);
        b.throw(l2, handler, 21);
        b.function(l2, "call22", 22);
        let trace = b.build();

        for node in trace.nodes().iter().skip(2) {
            if let Some(out) = node.out_function_index {
                assert_eq!(trace.parent_function(out), Some(out));
            }
        }
    }
}
