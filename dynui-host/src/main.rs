//! dynui host
//!
//! Replays a JSON-lines script of function results through the engine and
//! prints what every placement would show afterwards.
//!
//! Usage:
//!   dynui-host --script results.jsonl [--config dynui.toml] [--verbose]
//!
//! Logs go to stderr; stdout carries only the rendered placements.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dynui_engine::{EngineConfig, Orchestrator};
use dynui_host::{parse_script, replay};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "dynui-host")]
#[command(about = "Replay function results through the dynui engine")]
struct Args {
    /// JSON-lines script of function completions
    #[arg(short, long)]
    script: PathBuf,

    /// Engine config file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "dynui.toml")]
    config: PathBuf,

    /// Print single-line JSON instead of pretty output
    #[arg(long)]
    compact: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = EngineConfig::load_from(&args.config);
    let engine = Orchestrator::with_system_clock(config).context("Failed to build engine")?;

    let contents = tokio::fs::read_to_string(&args.script)
        .await
        .with_context(|| format!("Failed to read script {:?}", args.script))?;
    let lines = parse_script(&contents).context("Failed to parse script")?;
    info!("Replaying {} completions from {:?}", lines.len(), args.script);

    let (handle, task) = dynui_host::spawn(engine);
    let submitted = replay(&handle, &lines).await?;
    let snapshot = handle.snapshot().await?;
    handle.shutdown().await?;
    let engine = task.await.context("Host event loop failed")?;

    info!(
        submitted,
        stored = engine.len(),
        version = snapshot.version,
        "Replay finished"
    );

    let output = if args.compact {
        serde_json::to_string(&snapshot)?
    } else {
        serde_json::to_string_pretty(&snapshot)?
    };
    println!("{output}");
    Ok(())
}
