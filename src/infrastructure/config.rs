//! Configuration file support.
//!
//! A `runlens.toml` may set defaults for the CLI; flags given on the command
//! line take precedence.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_PORT: u16 = 4590;
pub const DEFAULT_LOG_FILTER: &str = "runlens=info";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Function shown first; the program entry point if unset
    pub entry_function: Option<usize>,
    /// Port for `--serve` when none is given
    pub port: u16,
    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Output format (json, dot)
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entry_function: None,
            port: DEFAULT_PORT,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            format: "json".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
