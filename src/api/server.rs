use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use crate::api::dto::{
    ClickParams, FunctionDto, IndexParams, IterationParams, LineParams, LoadParams, LoadedDto,
    SelectionParams,
};
use crate::application::Navigator;
use crate::domain::range::Position;
use crate::domain::trace::Trace;
use crate::infrastructure::JsonTraceFile;
use crate::ports::TraceSource;

#[derive(Debug, Deserialize)]
struct CommandReq {
    command: String,
    params: Option<serde_json::Value>,
}

/// Per-connection state: the loaded trace and what the client looks at.
#[derive(Default)]
struct Session {
    navigator: Option<Navigator>,
}

enum Outcome {
    Reply(serde_json::Value),
    Shutdown(serde_json::Value),
}

pub fn start_server(port: u16) -> Result<()> {
    let address = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&address)
        .with_context(|| format!("Failed to bind to {}", address))?;
    serve(listener)
}

/// Accept connections forever; each one gets its own thread and session.
pub fn serve(listener: TcpListener) -> Result<()> {
    tracing::info!("[API] Server listening on {}", listener.local_addr()?);

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                thread::spawn(move || {
                    if let Err(e) = handle_connection(stream) {
                        tracing::warn!("[API] Connection error: {}", e);
                    }
                });
            }
            Err(e) => tracing::warn!("[API] Accept error: {}", e),
        }
    }

    Ok(())
}

fn handle_connection(mut stream: TcpStream) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut session = Session::default();
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            break; // Connection closed
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (response, shutdown) = match process_command(&mut session, trimmed) {
            Ok(Outcome::Reply(data)) => (json!({"status": "success", "data": data}), false),
            Ok(Outcome::Shutdown(data)) => (json!({"status": "success", "data": data}), true),
            Err(e) => (json!({"status": "error", "message": format!("{:#}", e)}), false),
        };

        let response_str = serde_json::to_string(&response)?;
        stream.write_all(response_str.as_bytes())?;
        stream.write_all(b"\n")?;

        if shutdown {
            tracing::info!("[API] Shutdown requested.");
            stream.flush()?;
            std::process::exit(0);
        }
    }
    Ok(())
}

fn process_command(session: &mut Session, json_str: &str) -> Result<Outcome> {
    let req: CommandReq = serde_json::from_str(json_str)
        .context("Invalid JSON format")?;
    tracing::debug!("[API] Command {}", req.command);

    let data = match req.command.as_str() {
        "PING" => json!("PONG"),
        "SHUTDOWN" => return Ok(Outcome::Shutdown(json!("Shutting down..."))),
        "LOAD" => handle_load(session, req.params)?,
        other => {
            let navigator = session
                .navigator
                .as_mut()
                .ok_or_else(|| anyhow::anyhow!("No trace loaded"))?;
            handle_query(navigator, other, req.params)?
        }
    };
    Ok(Outcome::Reply(data))
}

fn handle_load(session: &mut Session, params: Option<serde_json::Value>) -> Result<serde_json::Value> {
    let params: LoadParams = parse_params("LOAD", params)?;

    let records = match (params.path, params.records) {
        (_, Some(records)) => records,
        (Some(path), None) => JsonTraceFile::new(&path).load_records()?,
        (None, None) => anyhow::bail!("LOAD needs 'path' or 'records'"),
    };

    // A failed load leaves the previous trace in place.
    let trace = Trace::load(records).context("Trace rejected")?;
    let loaded = LoadedDto::from(&trace);
    session.navigator = Some(Navigator::new(trace));

    Ok(serde_json::to_value(loaded)?)
}

fn handle_query(
    navigator: &mut Navigator,
    command: &str,
    params: Option<serde_json::Value>,
) -> Result<serde_json::Value> {
    let data = match command {
        "VIEW" => serde_json::to_value(navigator.view())?,
        "FUNCTIONS" => serde_json::to_value(FunctionDto::list(navigator.trace()))?,
        "FUNCTION_TREE" => serde_json::to_value(navigator.trace().function_tree())?,
        "SELECT_ITERATIONS" => {
            let p: SelectionParams = parse_params(command, params)?;
            json!(navigator.trace().select_iterations(p.function, &p.iterations))
        }
        "ACTIVE_RANGES" => {
            let p: SelectionParams = parse_params(command, params)?;
            serde_json::to_value(navigator.trace().active_ranges(p.function, &p.iterations))?
        }
        "JUMP_TARGETS" => {
            let p: SelectionParams = parse_params(command, params)?;
            json!(navigator.trace().jump_targets(p.function, &p.iterations))
        }
        "HINTS" => {
            json!(navigator.trace().iteration_hints(navigator.iterations()))
        }
        "TRACE_IDS_AT_LINE" => {
            let p: LineParams = parse_params(command, params)?;
            json!(navigator.trace().trace_ids_at_line(&p.file, p.line))
        }
        "SELECT_FUNCTION" => {
            let p: IndexParams = parse_params(command, params)?;
            if !navigator.select_function(p.index) {
                anyhow::bail!("Node {} is not a function", p.index);
            }
            serde_json::to_value(navigator.view())?
        }
        "CLICK" => {
            let p: ClickParams = parse_params(command, params)?;
            let moved = navigator.click(Position::new(p.line, p.column));
            json!({"moved": moved, "view": navigator.view()})
        }
        "SET_ITERATION" => {
            let p: IterationParams = parse_params(command, params)?;
            let changed = navigator.set_iteration(p.slot, p.iteration);
            json!({"changed": changed, "view": navigator.view()})
        }
        _ => anyhow::bail!("Unknown command: {}", command),
    };
    Ok(data)
}

fn parse_params<T: DeserializeOwned>(command: &str, params: Option<serde_json::Value>) -> Result<T> {
    let params = params.ok_or_else(|| anyhow::anyhow!("Missing params for {}", command))?;
    serde_json::from_value(params).with_context(|| format!("Invalid params for {}", command))
}
