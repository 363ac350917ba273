//! The in-memory trace: a flat arena of nodes addressed by index.
//!
//! A [`Trace`] is built once from the wire records, validated, linked by
//! [`linker::link`](crate::domain::linker::link) and never mutated again.
//! Loading a new trace means building a new [`Trace`].

use crate::domain::error::TraceError;
use crate::domain::linker;
use crate::domain::range::{Position, Range, SourceLink};
use crate::domain::record::{parse_records, NodeType, TraceRecord};
use serde::Serialize;

/// Handle of a node inside a [`Trace`].
pub type NodeIndex = usize;

/// Index of the program's entry function.
pub const MAIN_INDEX: NodeIndex = 1;

/// Marker separating the base trace id from the iteration suffix.
pub const ITERATION_MARKER: &str = "_iter";

/// A validated trace node plus the links derived at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceNode {
    pub index: NodeIndex,
    pub node_type: NodeType,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
    pub trace_id: String,
    pub iteration: u32,
    pub ranges: Vec<Range>,
    pub link: Option<SourceLink>,
    /// Throw: the handler node. Function: where the return walk starts.
    pub out_index: Option<NodeIndex>,
    pub out_links: Vec<SourceLink>,
    pub method_name: Option<String>,

    // Derived by the linker
    pub out_function_index: Option<NodeIndex>,
    pub out_loop_iterations: Vec<NodeIndex>,
    pub link_position: Option<Position>,
    pub out_link_position: Option<Position>,
}

impl TraceNode {
    pub fn is_function(&self) -> bool {
        self.node_type == NodeType::Function
    }

    pub fn is_loop(&self) -> bool {
        self.node_type == NodeType::Loop
    }

    pub fn base_trace_id(&self) -> &str {
        Trace::base_trace_id(&self.trace_id)
    }

    pub fn link_range(&self) -> Option<&Range> {
        self.link.as_ref().map(|l| &l.range)
    }
}

/// Function hierarchy entry, as shown in a method tree.
///
/// Links are indices so that call chains of any depth stay flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionTreeNode {
    pub index: NodeIndex,
    pub name: Option<String>,
    /// Enclosing function, when the call was made directly in its body
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
}

/// A loaded, validated and linked execution trace.
#[derive(Debug, Clone)]
pub struct Trace {
    nodes: Vec<TraceNode>,
    max_depth: usize,
}

impl Trace {
    /// Validate the records and compute derived links.
    ///
    /// Fails as a whole on any structural problem; there is no partially
    /// usable trace.
    pub fn load(records: Vec<TraceRecord>) -> Result<Self, TraceError> {
        if records.len() <= MAIN_INDEX {
            return Err(TraceError::Empty);
        }
        if records[MAIN_INDEX].node_type != NodeType::Function {
            return Err(TraceError::RootNotFunction(records[MAIN_INDEX].node_type.as_str()));
        }

        let len = records.len();
        let mut nodes = Vec::with_capacity(len);
        for (index, record) in records.into_iter().enumerate() {
            nodes.push(Self::convert(index, record, len)?);
        }

        Self::check_consistency(&nodes)?;
        let max_depth = Self::check_acyclic(&nodes)?;
        linker::link(&mut nodes, max_depth)?;

        tracing::debug!(
            "[Trace] Loaded {} nodes (max depth {})",
            nodes.len(),
            max_depth
        );

        Ok(Self { nodes, max_depth })
    }

    /// Parse and load a JSON array of records.
    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        Self::load(parse_records(json)?)
    }

    fn convert(index: NodeIndex, record: TraceRecord, len: usize) -> Result<TraceNode, TraceError> {
        let in_range = |i: i64, min: usize| i >= min as i64 && (i as usize) < len;

        // The sentinel and the root carry no tree links of their own.
        let parent = if index <= MAIN_INDEX {
            None
        } else {
            match record.parent_index {
                Some(p) if p >= 0 => {
                    if !in_range(p, MAIN_INDEX) {
                        return Err(TraceError::ParentOutOfRange { node: index, parent: p });
                    }
                    Some(p as NodeIndex)
                }
                _ => return Err(TraceError::MissingParent(index)),
            }
        };

        let children = if index == 0 {
            Vec::new()
        } else {
            record
                .children_indices
                .iter()
                .map(|&c| {
                    if in_range(c, MAIN_INDEX + 1) {
                        Ok(c as NodeIndex)
                    } else {
                        Err(TraceError::ChildOutOfRange { node: index, child: c })
                    }
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let out_index = if index <= MAIN_INDEX {
            None
        } else {
            match (record.node_type, record.out_index) {
                (_, Some(out)) if !in_range(out, MAIN_INDEX) => {
                    return Err(TraceError::OutIndexOutOfRange { node: index, out });
                }
                (_, Some(out)) => Some(out as NodeIndex),
                (NodeType::Throw, None) => {
                    return Err(TraceError::MissingOutIndex {
                        node: index,
                        kind: NodeType::Throw.as_str(),
                    });
                }
                // A call returns into the node that encloses it.
                (NodeType::Function, None) => parent,
                (_, None) => None,
            }
        };

        Ok(TraceNode {
            index,
            node_type: record.node_type,
            parent,
            children,
            trace_id: record.trace_id,
            iteration: record.iteration,
            ranges: record.ranges,
            link: record.link,
            out_index,
            out_links: record.out_links,
            method_name: record.node_method_name,
            out_function_index: None,
            out_loop_iterations: Vec::new(),
            link_position: None,
            out_link_position: None,
        })
    }

    fn check_consistency(nodes: &[TraceNode]) -> Result<(), TraceError> {
        for node in nodes.iter().skip(MAIN_INDEX) {
            for &child in &node.children {
                let parent = nodes[child].parent.ok_or(TraceError::MissingParent(child))?;
                if parent != node.index {
                    return Err(TraceError::ChildParentMismatch {
                        child,
                        listed_by: node.index,
                        parent,
                    });
                }
            }
        }
        for node in nodes.iter().skip(MAIN_INDEX + 1) {
            let parent = node.parent.ok_or(TraceError::MissingParent(node.index))?;
            if !nodes[parent].children.contains(&node.index) {
                return Err(TraceError::ChildParentMismatch {
                    child: node.index,
                    listed_by: parent,
                    parent,
                });
            }
        }
        Ok(())
    }

    /// Every parent chain must end at the root. Returns the maximum depth.
    fn check_acyclic(nodes: &[TraceNode]) -> Result<usize, TraceError> {
        let mut depths: Vec<Option<usize>> = vec![None; nodes.len()];
        depths[MAIN_INDEX] = Some(0);
        let mut path = Vec::new();

        for start in MAIN_INDEX + 1..nodes.len() {
            path.clear();
            let mut cur = start;
            let base = loop {
                if let Some(depth) = depths[cur] {
                    break depth;
                }
                if path.len() > nodes.len() {
                    return Err(TraceError::Cycle(start));
                }
                path.push(cur);
                cur = nodes[cur].parent.ok_or(TraceError::MissingParent(cur))?;
            };
            for (offset, &index) in path.iter().rev().enumerate() {
                depths[index] = Some(base + offset + 1);
            }
        }

        Ok(depths.into_iter().flatten().max().unwrap_or(0))
    }

    /// Returns the nodes in the arena.
    #[inline]
    pub fn nodes(&self) -> &[TraceNode] {
        &self.nodes
    }

    pub fn node(&self, index: NodeIndex) -> Option<&TraceNode> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest parent chain below the root.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Index of the program's entry function.
    pub fn main(&self) -> NodeIndex {
        MAIN_INDEX
    }

    pub fn is_function(&self, index: NodeIndex) -> bool {
        index >= MAIN_INDEX && self.node(index).is_some_and(TraceNode::is_function)
    }

    /// Strip the iteration suffix: `"loop42_iter3"` becomes `"loop42"`.
    pub fn base_trace_id(trace_id: &str) -> &str {
        match trace_id.find(ITERATION_MARKER) {
            Some(pos) => &trace_id[..pos],
            None => trace_id,
        }
    }

    /// Highest iteration number among the siblings of `index` that belong to
    /// the same loop.
    pub fn last_iteration_number(&self, index: NodeIndex) -> u32 {
        let Some(node) = self.node(index) else {
            return 0;
        };
        let Some(parent) = node.parent.and_then(|p| self.node(p)) else {
            return node.iteration;
        };
        let base = node.base_trace_id();
        parent
            .children
            .iter()
            .map(|&c| &self.nodes[c])
            .filter(|sibling| sibling.base_trace_id() == base)
            .map(|sibling| sibling.iteration)
            .fold(node.iteration, u32::max)
    }

    /// Nearest ancestor-or-self of type Function.
    pub fn parent_function(&self, index: NodeIndex) -> Option<NodeIndex> {
        if index < MAIN_INDEX || index >= self.nodes.len() {
            return None;
        }
        let mut cur = index;
        // Bounded by depth; the tree was checked for cycles at load.
        for _ in 0..=self.max_depth {
            let node = &self.nodes[cur];
            if node.is_function() {
                return Some(cur);
            }
            cur = node.parent?;
        }
        None
    }

    /// Source file a node's ranges belong to.
    pub fn file_of(&self, index: NodeIndex) -> Option<&str> {
        let function = self.parent_function(index)?;
        self.nodes[function].link.as_ref().map(|l| l.file.as_str())
    }

    /// All function nodes, in trace order.
    pub fn functions(&self) -> Vec<NodeIndex> {
        self.nodes
            .iter()
            .skip(MAIN_INDEX)
            .filter(|n| n.is_function())
            .map(|n| n.index)
            .collect()
    }

    /// Function hierarchy in trace order. A function whose parent node is
    /// not a Function is a root; every function lists its direct Function
    /// children.
    pub fn function_tree(&self) -> Vec<FunctionTreeNode> {
        self.functions()
            .into_iter()
            .map(|index| {
                let node = &self.nodes[index];
                FunctionTreeNode {
                    index,
                    name: node.method_name.clone(),
                    parent: node.parent.filter(|&p| self.nodes[p].is_function()),
                    children: node
                        .children
                        .iter()
                        .copied()
                        .filter(|&c| self.nodes[c].is_function())
                        .collect(),
                }
            })
            .collect()
    }

    /// Trace ids of the nodes with a range covering `line` of `file`.
    pub fn trace_ids_at_line(&self, file: &str, line: u32) -> Vec<&str> {
        self.nodes
            .iter()
            .skip(MAIN_INDEX)
            .filter(|n| !n.trace_id.is_empty())
            .filter(|n| n.ranges.iter().any(|r| r.covers_line(line)))
            .filter(|n| self.file_of(n.index) == Some(file))
            .map(|n| n.trace_id.as_str())
            .collect()
    }

    /// A function/selection pair the resolvers can work with.
    pub(crate) fn is_valid_selection(&self, function: NodeIndex, selection: &[NodeIndex]) -> bool {
        if !self.is_function(function) {
            tracing::debug!("[Trace] Node {} is not a function", function);
            return false;
        }
        if let Some(&bad) = selection.iter().find(|&&i| i < MAIN_INDEX || i >= self.nodes.len()) {
            tracing::debug!("[Trace] Iteration index {} is not in the trace", bad);
            return false;
        }
        true
    }
}
