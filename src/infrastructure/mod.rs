// Infrastructure implementations for RunLens.

pub mod config;
pub mod logging;
pub mod trace_loader;

use crate::domain::trace::Trace;
use crate::domain::view::View;
use crate::ports::ViewExporter;

pub use config::Config;
pub use trace_loader::JsonTraceFile;

/// Writes the resolved view as pretty-printed JSON.
pub struct JsonViewExporter;
impl ViewExporter for JsonViewExporter {
    fn export(&self, _trace: &Trace, view: &View, path: &str) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(view)?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing::TraceBuilder;
    use crate::domain::trace::MAIN_INDEX;
    use tempfile::tempdir;

    #[test]
    fn test_json_view_export() {
        let mut b = TraceBuilder::new();
        b.loop_iteration(MAIN_INDEX, "loop3", 1, 3);
        let trace = b.build();
        let view = trace.view(MAIN_INDEX, &trace.select_iterations(MAIN_INDEX, &[]), None);

        let dir = tempdir().unwrap();
        let path = dir.path().join("view.json");
        JsonViewExporter
            .export(&trace, &view, path.to_str().unwrap())
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["function"], 1);
        assert_eq!(written["file"], "Main.java");
        assert_eq!(written["ranges"][0]["startLine"], 1);
        assert_eq!(written["hints"][0]["last"], 1);
    }
}
