// Command-line entry point for RunLens.

use anyhow::{Context, Result};
use clap::Parser;
use runlens::api::server;
use runlens::application::ExportUsecase;
use runlens::infrastructure::logging::init_logging;
use runlens::infrastructure::{Config, JsonTraceFile, JsonViewExporter};
use runlens::ports::trace_tree_exporter::TraceTreeExporter;
use runlens::ports::ViewExporter;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Trace JSON file recorded from a program run
    #[arg(short, long)]
    trace: Option<String>,

    /// Index of the function to show (defaults to the entry point)
    #[arg(long)]
    function: Option<usize>,

    /// Loop iteration nodes to select, comma separated
    #[arg(short, long, value_delimiter = ',')]
    iterations: Vec<usize>,

    /// Output file path
    #[arg(short, long)]
    output: Option<String>,

    /// Output format (json, dot)
    #[arg(short, long)]
    format: Option<String>,

    /// Run the JSON command server instead, optionally on the given port
    #[arg(long, num_args = 0..=1)]
    serve: Option<Option<u16>>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::default(),
    };
    init_logging(&config.log_filter)?;

    if let Some(port) = cli.serve {
        let port = port.unwrap_or(config.port);
        tracing::info!("[RunLens] Starting API server on port {}", port);
        return server::start_server(port);
    }

    let trace_path = cli
        .trace
        .context("Please provide --trace <file> or --serve [PORT]")?;
    let format = cli.format.unwrap_or(config.format);
    let output = cli
        .output
        .unwrap_or_else(|| format!("view.{}", format));

    let exporter: &dyn ViewExporter = match format.as_str() {
        "json" => &JsonViewExporter,
        "dot" => &TraceTreeExporter,
        other => anyhow::bail!("Unsupported format: {} (expected json or dot)", other),
    };

    let source = JsonTraceFile::new(&trace_path);
    let usecase = ExportUsecase {
        source: &source,
        exporter,
    };

    let function = cli.function.or(config.entry_function);
    let iterations = (!cli.iterations.is_empty()).then_some(cli.iterations.as_slice());

    let view = usecase.run(function, iterations, &output)?;
    tracing::info!(
        "[RunLens] Function {} ({} active ranges, {} jump targets)",
        view.function,
        view.ranges.len(),
        view.jumps.len()
    );
    println!(
        "View written to {} (format: {})",
        output, format
    );
    Ok(())
}
