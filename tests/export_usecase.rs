use runlens::application::ExportUsecase;
use runlens::infrastructure::{JsonTraceFile, JsonViewExporter};
use runlens::ports::trace_tree_exporter::TraceTreeExporter;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn fixture() -> JsonTraceFile {
    JsonTraceFile::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/loop_calls.json"))
}

#[test]
fn test_export_json_view_of_selected_iteration() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("view.json");
    let source = fixture();

    let usecase = ExportUsecase {
        source: &source,
        exporter: &JsonViewExporter,
    };
    let view = usecase
        .run(None, Some(&[4][..]), out.to_str().unwrap())
        .expect("export should succeed");
    assert_eq!(view.jumps, vec![1, 5, 8]);

    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["iterations"], serde_json::json!([4]));
    assert_eq!(written["file"], "Main.java");
    assert_eq!(written["hints"][0]["iteration"], 2);
}

#[test]
fn test_export_dot_of_callee() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("view.dot");
    let source = fixture();

    let usecase = ExportUsecase {
        source: &source,
        exporter: &TraceTreeExporter,
    };
    let view = usecase.run(Some(3), None, out.to_str().unwrap()).unwrap();
    assert_eq!(view.function, 3);
    assert!(view.iterations.is_empty());

    let dot = fs::read_to_string(&out).unwrap();
    assert!(dot.starts_with("digraph TraceTree {"));
    assert!(dot.contains("helper"));
}

#[test]
fn test_export_rejects_non_function_entry() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("view.json");
    let source = fixture();

    let usecase = ExportUsecase {
        source: &source,
        exporter: &JsonViewExporter,
    };
    let err = usecase.run(Some(2), None, out.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("not a function"));
    assert!(!out.exists());
}
