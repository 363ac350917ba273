use serde::{Deserialize, Serialize};
use crate::domain::record::TraceRecord;
use crate::domain::trace::{NodeIndex, Trace};

/// Parameters of `LOAD`: a trace file on disk or the records inline.
#[derive(Debug, Deserialize)]
pub struct LoadParams {
    pub path: Option<String>,
    pub records: Option<Vec<TraceRecord>>,
}

/// Parameters of the stateless engine queries.
#[derive(Debug, Deserialize)]
pub struct SelectionParams {
    pub function: NodeIndex,
    #[serde(default, alias = "prior")]
    pub iterations: Vec<NodeIndex>,
}

#[derive(Debug, Deserialize)]
pub struct IndexParams {
    pub index: NodeIndex,
}

#[derive(Debug, Deserialize)]
pub struct ClickParams {
    pub line: u32,
    pub column: u32,
}

/// Parameters of `TRACE_IDS_AT_LINE` (hover lookup).
#[derive(Debug, Deserialize)]
pub struct LineParams {
    pub file: String,
    pub line: u32,
}

#[derive(Debug, Deserialize)]
pub struct IterationParams {
    pub slot: usize,
    pub iteration: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadedDto {
    pub nodes: usize,
    pub functions: usize,
    pub max_depth: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FunctionDto {
    pub index: NodeIndex,
    pub name: String,
    pub file: Option<String>,
}

impl From<&Trace> for LoadedDto {
    fn from(trace: &Trace) -> Self {
        LoadedDto {
            nodes: trace.len(),
            functions: trace.functions().len(),
            max_depth: trace.max_depth(),
        }
    }
}

impl FunctionDto {
    pub fn list(trace: &Trace) -> Vec<FunctionDto> {
        trace
            .functions()
            .into_iter()
            .filter_map(|index| {
                let node = trace.node(index)?;
                Some(FunctionDto {
                    index,
                    name: node
                        .method_name
                        .clone()
                        .unwrap_or_else(|| "UnnamedMethod".to_string()),
                    file: node.link.as_ref().map(|l| l.file.clone()),
                })
            })
            .collect()
    }
}
