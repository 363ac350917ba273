//! Loop-iteration selection.
//!
//! A selection is an ordered list of loop-iteration node indices, one per
//! loop reached in a depth-first walk of a function, without entering
//! nested calls. The resolvers consume it in that same order.

use crate::domain::range::Position;
use crate::domain::trace::{NodeIndex, Trace, TraceNode};
use serde::Serialize;
use std::collections::HashSet;

/// The "(current/last)" marker shown next to an active loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IterationHint {
    pub index: NodeIndex,
    pub position: Position,
    pub iteration: u32,
    pub last: u32,
}

struct Selector<'a> {
    trace: &'a Trace,
    active: Vec<NodeIndex>,
    cursor: usize,
    skip: HashSet<&'a str>,
}

impl<'a> Selector<'a> {
    fn visit(&mut self, index: NodeIndex) {
        let trace = self.trace;
        let node = &trace.nodes()[index];
        if node.is_function() || self.skip.contains(node.base_trace_id()) {
            return;
        }

        let expand = !node.is_loop() || self.choose(node);
        if expand {
            for &child in &node.children {
                self.visit(child);
            }
        }
    }

    /// Whether `node` is the representative of its loop: either the
    /// iteration matching the next prior entry, or the first iteration once
    /// the prior entries are used up.
    fn choose(&mut self, node: &'a TraceNode) -> bool {
        let chosen = match self.active.get(self.cursor).copied() {
            None if node.iteration == 1 => {
                self.active.push(node.index);
                true
            }
            None => false,
            Some(expected) => self.trace.nodes()[expected].iteration == node.iteration,
        };
        if chosen {
            self.cursor += 1;
            self.skip.insert(node.base_trace_id());
        }
        chosen
    }
}

impl Trace {
    /// Complete `prior` into a selection covering every loop of `function`.
    ///
    /// Where a loop's iteration matches the next prior entry, that entry is
    /// kept; otherwise the loop's first iteration is chosen. Returns an
    /// empty selection if `function` is not a Function node or `prior`
    /// refers to nodes outside the trace.
    pub fn select_iterations(&self, function: NodeIndex, prior: &[NodeIndex]) -> Vec<NodeIndex> {
        if !self.is_valid_selection(function, prior) {
            return Vec::new();
        }

        let mut selector = Selector {
            trace: self,
            active: prior.to_vec(),
            cursor: 0,
            skip: HashSet::new(),
        };
        for &child in &self.nodes()[function].children {
            selector.visit(child);
        }
        selector.active
    }

    /// The sibling of `current` in the same loop with the given iteration
    /// number, or `current` itself when that iteration was never recorded.
    pub fn change_iteration(&self, current: NodeIndex, iteration: u32) -> NodeIndex {
        let Some(node) = self.node(current) else {
            return current;
        };
        let base = node.base_trace_id();
        let found = node.parent.and_then(|parent| {
            self.nodes()[parent]
                .children
                .iter()
                .copied()
                .find(|&c| {
                    let candidate = &self.nodes()[c];
                    candidate.base_trace_id() == base && candidate.iteration == iteration
                })
        });

        match found {
            Some(index) => index,
            None => {
                tracing::debug!(
                    "[Iterations] Loop {} has no iteration {}; keeping {}",
                    base,
                    iteration,
                    node.iteration
                );
                current
            }
        }
    }

    /// Iteration markers for every selected loop that has a link.
    pub fn iteration_hints(&self, selection: &[NodeIndex]) -> Vec<IterationHint> {
        selection
            .iter()
            .filter_map(|&index| {
                let node = self.node(index)?;
                Some(IterationHint {
                    index,
                    position: node.link_range()?.start(),
                    iteration: node.iteration,
                    last: self.last_iteration_number(index),
                })
            })
            .collect()
    }
}
