//! tandem binary
//!
//! One-shot classifiers for captured screens plus an interactive `run`
//! mode that drives a live session from stdin.

mod cli;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use tandem_protocol::{SessionKey, ToolId};
use tandem_utils::{init_logging_with_config, LogConfig, Result, TandemError};

use tandem_server::adapters::resolve_cwd;
use tandem_server::config::config_handle;
use tandem_server::{
    detect_prompt, detect_session_status, BroadcastSink, CliTool, ConfigLoader, DetectOptions,
    MemoryStore, SessionMonitor, Tmux,
};

use cli::{Args, Command};

#[tokio::main]
async fn main() {
    let args = Args::parse_args();

    let log_config = match args.command {
        Command::Run { .. } => LogConfig::monitor(),
        _ => LogConfig::cli(),
    };
    if let Err(e) = init_logging_with_config(log_config) {
        eprintln!("tandem: failed to initialise logging: {e}");
    }

    if let Err(e) = run(args).await {
        error!(error = %e, "Command failed");
        eprintln!("tandem: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Status { tool, file } => {
            let tool = parse_tool(&tool)?;
            let raw = read_input(file.as_deref())?;
            print_json(&detect_session_status(&raw, tool, None))
        }
        Command::DetectPrompt {
            file,
            no_default_indicator,
        } => {
            let raw = read_input(file.as_deref())?;
            let options = DetectOptions {
                require_default_indicator: !no_default_indicator,
            };
            print_json(&detect_prompt(&raw, &options))
        }
        Command::Run {
            workspace,
            tool,
            cwd,
            kill_on_exit,
        } => {
            let key = SessionKey::new(workspace, parse_tool(&tool)?);
            let config = ConfigLoader::load_optional(args.config.as_deref())?;
            run_session(key, cwd.as_deref(), kill_on_exit, config).await
        }
    }
}

async fn run_session(
    key: SessionKey,
    cwd: Option<&Path>,
    kill_on_exit: bool,
    config: tandem_server::AppConfig,
) -> Result<()> {
    let terminal = Arc::new(Tmux::new(config.terminal.tmux_binary.clone()));
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(BroadcastSink::default());
    let monitor = SessionMonitor::new(terminal, store, sink.clone(), config_handle(config));

    let mut events = sink.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!(error = %e, "Failed to serialize event"),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "Event printer lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    if monitor.adapter(key.tool).is_running(&key.workspace_id).await? {
        info!(key = %key, "Attaching to running session");
    } else {
        let cwd = resolve_cwd(cwd)?;
        monitor.start_session(&key, &cwd).await?;
    }
    monitor.start_polling(key.clone())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => {
                    if let Err(e) = monitor.send_message(&key, &line).await {
                        warn!(key = %key, error = %e, "Failed to send message");
                        eprintln!("tandem: {e}");
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    monitor.stop_all_polling();
    if kill_on_exit {
        monitor.kill_session(&key).await?;
    }
    drop(monitor);
    drop(sink);
    printer.abort();
    Ok(())
}

fn parse_tool(name: &str) -> Result<ToolId> {
    name.parse::<ToolId>()
        .map_err(|_| TandemError::UnknownTool(name.to_string()))
}

/// Read a capture from a file, or stdin when no path is given
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| TandemError::FileRead {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| TandemError::internal(format!("JSON encoding failed: {e}")))?;
    println!("{json}");
    Ok(())
}
