//! Everything the code view needs to render one selection.

use crate::domain::iterations::IterationHint;
use crate::domain::jumps::JumpAnchor;
use crate::domain::range::{Position, Range};
use crate::domain::trace::{NodeIndex, Trace, MAIN_INDEX};
use serde::Serialize;

/// Resolved state for a function + iteration selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub function: NodeIndex,
    /// File to display, taken from the function's link
    pub file: Option<String>,
    pub iterations: Vec<NodeIndex>,
    pub ranges: Vec<Range>,
    pub jumps: Vec<NodeIndex>,
    pub anchors: Vec<JumpAnchor>,
    pub hints: Vec<IterationHint>,
    /// Position to scroll to
    pub reveal: Option<Position>,
}

impl Trace {
    /// Resolve a complete view. `reveal` overrides the default scroll
    /// target, which is the entry point of the function.
    pub fn view(&self, function: NodeIndex, iterations: &[NodeIndex], reveal: Option<Position>) -> View {
        let node = self.node(function);
        let default_reveal = node.and_then(|n| {
            if function == MAIN_INDEX {
                n.link_range().map(|r| r.start())
            } else {
                n.link_position
            }
        });

        View {
            function,
            file: node.and_then(|n| n.link.as_ref()).map(|l| l.file.clone()),
            iterations: iterations.to_vec(),
            ranges: self.active_ranges(function, iterations),
            jumps: self.jump_targets(function, iterations),
            anchors: self.jump_anchors(function, iterations),
            hints: self.iteration_hints(iterations),
            reveal: reveal.or(default_reveal),
        }
    }
}
