//! Small builder for hand-made traces used by the unit tests.

use crate::domain::range::{Range, SourceLink};
use crate::domain::record::{NodeType, TraceRecord};
use crate::domain::trace::{NodeIndex, Trace, MAIN_INDEX};

pub(crate) struct TraceBuilder {
    records: Vec<TraceRecord>,
}

impl TraceBuilder {
    /// Sentinel at 0 and `main` at 1, with main's own range on lines 1-2.
    pub(crate) fn new() -> Self {
        let mut main = TraceRecord::new(NodeType::Function);
        main.parent_index = Some(-1);
        main.trace_id = "main".to_string();
        main.ranges = vec![Range::new(1, 1, 2, 1)];
        main.link = Some(SourceLink {
            file: "Main.java".to_string(),
            range: Range::new(1, 1, 1, 20),
        });
        main.node_method_name = Some("main".to_string());

        Self {
            records: vec![TraceRecord::new(NodeType::Statement), main],
        }
    }

    fn push(&mut self, parent: NodeIndex, mut record: TraceRecord) -> NodeIndex {
        let index = self.records.len();
        record.parent_index = Some(parent as i64);
        self.records[parent].children_indices.push(index as i64);
        self.records.push(record);
        index
    }

    /// A call at `line` of the caller; the callee has no body ranges.
    pub(crate) fn function(&mut self, parent: NodeIndex, trace_id: &str, line: u32) -> NodeIndex {
        let mut record = TraceRecord::new(NodeType::Function);
        record.trace_id = trace_id.to_string();
        record.link = Some(SourceLink {
            file: format!("{}.java", trace_id),
            range: Range::new(line, 5, line, 15),
        });
        record.out_links = vec![SourceLink {
            file: format!("{}.java", trace_id),
            range: Range::new(line + 100, 1, line + 100, 30),
        }];
        record.out_index = Some(parent as i64);
        record.node_method_name = Some(trace_id.to_string());
        self.push(parent, record)
    }

    /// A call with a second out link at `loop_line`, as recorded for calls
    /// made inside a loop.
    pub(crate) fn function_in_loop(
        &mut self,
        parent: NodeIndex,
        trace_id: &str,
        line: u32,
        loop_line: u32,
    ) -> NodeIndex {
        let index = self.function(parent, trace_id, line);
        let file = format!("{}.java", trace_id);
        self.records[index].out_links.push(SourceLink {
            file,
            range: Range::new(loop_line, 5, loop_line, 25),
        });
        index
    }

    pub(crate) fn loop_iteration(
        &mut self,
        parent: NodeIndex,
        base: &str,
        iteration: u32,
        line: u32,
    ) -> NodeIndex {
        let mut record = TraceRecord::new(NodeType::Loop);
        record.trace_id = format!("{}_iter{}", base, iteration);
        record.iteration = iteration;
        record.ranges = vec![Range::new(line, 1, line, 40)];
        record.link = Some(SourceLink {
            file: "Main.java".to_string(),
            range: Range::new(line, 1, line, 10),
        });
        self.push(parent, record)
    }

    pub(crate) fn statement(&mut self, parent: NodeIndex, line: u32) -> NodeIndex {
        let mut record = TraceRecord::new(NodeType::Statement);
        record.trace_id = format!("stmt{}", line);
        record.ranges = vec![Range::new(line, 1, line, 30)];
        self.push(parent, record)
    }

    pub(crate) fn throw(&mut self, parent: NodeIndex, handler: NodeIndex, line: u32) -> NodeIndex {
        let mut record = TraceRecord::new(NodeType::Throw);
        record.trace_id = format!("throw{}", line);
        record.ranges = vec![Range::new(line, 1, line, 25)];
        record.out_index = Some(handler as i64);
        self.push(parent, record)
    }

    pub(crate) fn records(&self) -> Vec<TraceRecord> {
        self.records.clone()
    }

    pub(crate) fn build(&self) -> Trace {
        Trace::load(self.records()).expect("test trace should load")
    }
}

#[test]
fn test_builder_produces_valid_tree() {
    let mut b = TraceBuilder::new();
    let l1 = b.loop_iteration(MAIN_INDEX, "loop3", 1, 3);
    b.statement(l1, 4);
    let trace = b.build();
    assert_eq!(trace.len(), 4);
    assert_eq!(trace.node(l1).unwrap().parent, Some(MAIN_INDEX));
}
