//! Wire shape of a single trace record, as emitted by the tracing backend.

use crate::domain::range::{Range, SourceLink};
use serde::{Deserialize, Serialize};

/// Classification of trace nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// A function activation (entered call)
    Function,
    /// One iteration of a loop
    Loop,
    /// A thrown exception, linked to its handler
    Throw,
    /// A plain executed span with no control-flow role
    Statement,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Function => "Function",
            NodeType::Loop => "Loop",
            NodeType::Throw => "Throw",
            NodeType::Statement => "Statement",
        }
    }
}

/// One element of the trace array.
///
/// Indices are kept signed here because the backend writes `-1` (or `null`)
/// for "no parent"; [`Trace::load`](crate::domain::trace::Trace::load)
/// validates and converts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceRecord {
    pub node_type: NodeType,
    #[serde(default)]
    pub parent_index: Option<i64>,
    #[serde(default)]
    pub children_indices: Vec<i64>,
    #[serde(default)]
    pub trace_id: String,
    #[serde(default)]
    pub iteration: u32,
    #[serde(default)]
    pub ranges: Vec<Range>,
    #[serde(default)]
    pub link: Option<SourceLink>,
    #[serde(default)]
    pub out_index: Option<i64>,
    #[serde(default)]
    pub out_links: Vec<SourceLink>,
    #[serde(default)]
    pub node_method_name: Option<String>,
}

impl TraceRecord {
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent_index: None,
            children_indices: Vec::new(),
            trace_id: String::new(),
            iteration: 0,
            ranges: Vec::new(),
            link: None,
            out_index: None,
            out_links: Vec::new(),
            node_method_name: None,
        }
    }
}

/// Parse a JSON array of trace records.
pub fn parse_records(json: &str) -> serde_json::Result<Vec<TraceRecord>> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_and_full_records() {
        let json = r#"[
            {"nodeType": "Statement", "parentIndex": null},
            {
                "nodeType": "Function",
                "parentIndex": -1,
                "childrenIndices": [2],
                "traceId": "main",
                "ranges": [{"startLine": 1, "startColumn": 1, "endLine": 9, "endColumn": 2}],
                "link": {"file": "Main.java", "range": {"startLine": 1, "startColumn": 1, "endLine": 1, "endColumn": 20}},
                "nodeMethodName": "main"
            },
            {
                "nodeType": "Loop",
                "parentIndex": 1,
                "traceId": "loop3_iter1",
                "iteration": 1
            }
        ]"#;

        let records = parse_records(json).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].node_type, NodeType::Statement);
        assert_eq!(records[0].parent_index, None);
        assert_eq!(records[1].parent_index, Some(-1));
        assert_eq!(records[1].children_indices, vec![2]);
        assert_eq!(records[1].link.as_ref().unwrap().file, "Main.java");
        assert_eq!(records[1].node_method_name.as_deref(), Some("main"));
        assert_eq!(records[2].iteration, 1);
        assert!(records[2].out_links.is_empty());
    }

    #[test]
    fn test_unknown_node_type_is_rejected() {
        let json = r#"[{"nodeType": "Branch"}]"#;
        assert!(parse_records(json).is_err());
    }
}
