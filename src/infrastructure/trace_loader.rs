use crate::domain::record::{parse_records, TraceRecord};
use crate::ports::TraceSource;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Trace records stored as a JSON array in a file.
pub struct JsonTraceFile {
    path: PathBuf,
}

impl JsonTraceFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TraceSource for JsonTraceFile {
    fn load_records(&self) -> Result<Vec<TraceRecord>> {
        if !self.path.exists() {
            anyhow::bail!("Trace file not found: {}", self.path.display());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read trace file {}", self.path.display()))?;
        let records = parse_records(&content)
            .with_context(|| format!("Invalid trace JSON in {}", self.path.display()))?;

        tracing::info!(
            "[Loader] Read {} trace records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}
