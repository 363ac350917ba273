//! Navigable control-flow links visible from a function + iteration selection.

use crate::domain::range::{Position, Range};
use crate::domain::record::NodeType;
use crate::domain::trace::{NodeIndex, Trace, TraceNode, MAIN_INDEX};
use crate::domain::walk::PathWalker;
use serde::Serialize;

/// Direction of a jump relative to the active function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorKind {
    /// Enter a nested call
    In,
    /// Leave the active context: return to the caller, or follow a throw to
    /// its handler
    Out,
}

/// Where a jump leads: the function to activate, the iterations to select
/// inside it and the position to reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub function: NodeIndex,
    pub iterations: Vec<NodeIndex>,
    pub position: Option<Position>,
}

/// A clickable range and the navigation it triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JumpAnchor {
    pub source: NodeIndex,
    pub kind: AnchorKind,
    pub range: Range,
    pub navigation: Navigation,
}

impl Trace {
    /// Function and Throw nodes reachable from `function` under the
    /// selection, preceded by `function` itself.
    pub fn jump_targets(&self, function: NodeIndex, selection: &[NodeIndex]) -> Vec<NodeIndex> {
        if !self.is_valid_selection(function, selection) {
            return Vec::new();
        }

        let mut jumps = vec![function];
        PathWalker::new(self, selection).walk(function, &mut |node| {
            if node.is_function() || node.node_type == NodeType::Throw {
                jumps.push(node.index);
            }
        });
        jumps
    }

    /// Clickable anchors of every jump target, in target order.
    ///
    /// The active function itself and every throw expose *out* anchors; every
    /// other reached call exposes an *in* anchor on its call site. The entry
    /// function has nowhere to return to and exposes nothing.
    pub fn jump_anchors(&self, function: NodeIndex, selection: &[NodeIndex]) -> Vec<JumpAnchor> {
        let targets = self.jump_targets(function, selection);
        let mut anchors = Vec::new();
        let mut active: Option<Vec<Range>> = None;

        for target in targets {
            if target == MAIN_INDEX {
                continue;
            }
            let node = &self.nodes()[target];

            if !node.is_function() || target == function {
                if let Some(navigation) = Self::out_navigation(node) {
                    for range in self.out_anchor_ranges(node, function, selection, &mut active) {
                        anchors.push(JumpAnchor {
                            source: target,
                            kind: AnchorKind::Out,
                            range,
                            navigation: navigation.clone(),
                        });
                    }
                }
            }

            if target != function && node.is_function() {
                if let Some(range) = node.link_range() {
                    anchors.push(JumpAnchor {
                        source: target,
                        kind: AnchorKind::In,
                        range: *range,
                        navigation: Navigation {
                            function: target,
                            iterations: self.select_iterations(target, &[]),
                            position: node.link_position,
                        },
                    });
                }
            }
        }
        anchors
    }

    /// The navigation triggered by clicking `position`, if any.
    ///
    /// When anchors overlap, the last one in target order wins.
    pub fn resolve_click(
        &self,
        function: NodeIndex,
        selection: &[NodeIndex],
        position: Position,
    ) -> Option<Navigation> {
        self.jump_anchors(function, selection)
            .into_iter()
            .rev()
            .find(|anchor| anchor.range.contains_position(position))
            .map(|anchor| anchor.navigation)
    }

    fn out_navigation(node: &TraceNode) -> Option<Navigation> {
        Some(Navigation {
            function: node.out_function_index?,
            iterations: node.out_loop_iterations.clone(),
            position: node.out_link_position,
        })
    }

    /// Ranges that act as *out* anchors for `node`.
    ///
    /// A call made inside a loop records two out links; the first one only
    /// counts while it lies on the active path. Any other count is treated as
    /// a single target on the last out link. Throws without out links fall
    /// back to their own link.
    fn out_anchor_ranges(
        &self,
        node: &TraceNode,
        function: NodeIndex,
        selection: &[NodeIndex],
        active: &mut Option<Vec<Range>>,
    ) -> Vec<Range> {
        if node.is_function() && node.out_links.len() == 2 {
            let active = active.get_or_insert_with(|| self.active_ranges(function, selection));
            let mut ranges = vec![node.out_links[1].range];
            let first = node.out_links[0].range;
            if active.iter().any(|r| r.contains_range(&first)) {
                ranges.push(first);
            }
            return ranges;
        }
        match node.out_links.last() {
            Some(link) => vec![link.range],
            None if !node.is_function() => node.link_range().copied().into_iter().collect(),
            None => Vec::new(),
        }
    }
}
