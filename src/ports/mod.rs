use crate::domain::record::TraceRecord;
use crate::domain::trace::Trace;
use crate::domain::view::View;

pub mod trace_tree_exporter;

pub trait TraceSource {
    fn load_records(&self) -> anyhow::Result<Vec<TraceRecord>>;
}

pub trait ViewExporter {
    fn export(&self, trace: &Trace, view: &View, path: &str) -> std::io::Result<()>;
}
