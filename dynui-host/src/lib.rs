//! Composition root for the dynui engine.
//!
//! A single tokio task owns the [`Orchestrator`]. Function completions and
//! control commands arrive over an mpsc channel and are applied one at a time,
//! so the order completions arrive in is the order their instances are
//! stamped. A sweep timer evicts stale instances, and every state change is
//! published on a watch channel for UI dirty checks.

mod script;

pub use script::{ScriptLine, parse_script, replay};

use dynui_engine::{Orchestrator, RenderedComponent};
use dynui_types::{FunctionResult, Placement};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

const COMMAND_BUFFER: usize = 64;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host event loop has stopped")]
    Closed,

    #[error("script line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub type HostResult<T> = Result<T, HostError>;

/// A function call that finished on the backend.
#[derive(Debug, Clone)]
pub struct FunctionCompletion {
    pub function: String,
    pub result: FunctionResult,
}

#[derive(Debug)]
pub enum HostCommand {
    Completion(FunctionCompletion),
    /// Evict expired instances now instead of waiting for the timer.
    Sweep,
    Clear,
    Snapshot(oneshot::Sender<PlacementSnapshot>),
    Shutdown,
}

/// Everything visible, per placement, at one version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementSnapshot {
    pub version: u64,
    pub placements: BTreeMap<String, Vec<RenderedComponent>>,
}

impl PlacementSnapshot {
    pub fn capture(engine: &Orchestrator) -> Self {
        Self {
            version: engine.version(),
            placements: Placement::ALL
                .iter()
                .map(|p| (p.as_str().to_string(), engine.get_for_placement(*p)))
                .collect(),
        }
    }

    pub fn placement(&self, placement: Placement) -> &[RenderedComponent] {
        self.placements
            .get(placement.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Cloneable sender side of the event loop.
#[derive(Debug, Clone)]
pub struct HostHandle {
    commands: mpsc::Sender<HostCommand>,
    version: watch::Receiver<u64>,
}

impl HostHandle {
    /// Queues a completed function result for ingestion.
    pub async fn submit(&self, function: impl Into<String>, result: FunctionResult) -> HostResult<()> {
        self.send(HostCommand::Completion(FunctionCompletion {
            function: function.into(),
            result,
        }))
        .await
    }

    pub async fn sweep(&self) -> HostResult<()> {
        self.send(HostCommand::Sweep).await
    }

    pub async fn clear(&self) -> HostResult<()> {
        self.send(HostCommand::Clear).await
    }

    /// Renders every placement after all previously queued commands.
    pub async fn snapshot(&self) -> HostResult<PlacementSnapshot> {
        let (reply, response) = oneshot::channel();
        self.send(HostCommand::Snapshot(reply)).await?;
        response.await.map_err(|_| HostError::Closed)
    }

    pub async fn shutdown(&self) -> HostResult<()> {
        self.send(HostCommand::Shutdown).await
    }

    /// Last published engine version.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.clone()
    }

    async fn send(&self, command: HostCommand) -> HostResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| HostError::Closed)
    }
}

/// Spawns the event loop on the current runtime.
///
/// The join handle yields the engine back once the loop stops, either on
/// [`HostHandle::shutdown`] or when every handle has been dropped.
pub fn spawn(engine: Orchestrator) -> (HostHandle, JoinHandle<Orchestrator>) {
    let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
    let (version_tx, version_rx) = watch::channel(engine.version());
    let task = tokio::spawn(run(engine, receiver, version_tx));
    (
        HostHandle {
            commands,
            version: version_rx,
        },
        task,
    )
}

pub async fn run(
    mut engine: Orchestrator,
    mut commands: mpsc::Receiver<HostCommand>,
    version: watch::Sender<u64>,
) -> Orchestrator {
    let period = engine.config().sweep_interval();
    let mut sweep = tokio::time::interval_at(Instant::now() + period, period);
    sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(
        sweep_interval_ms = period.as_millis() as u64,
        max_age_ms = engine.config().max_age_ms,
        "Host event loop started"
    );

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("All host handles dropped");
                    break;
                };
                match command {
                    HostCommand::Completion(completion) => apply_completion(&mut engine, completion),
                    HostCommand::Sweep => {
                        engine.evict_expired();
                    }
                    HostCommand::Clear => {
                        engine.clear_all();
                    }
                    HostCommand::Snapshot(reply) => {
                        if reply.send(PlacementSnapshot::capture(&engine)).is_err() {
                            debug!("Snapshot requester went away");
                        }
                    }
                    HostCommand::Shutdown => break,
                }
            }
            _ = sweep.tick() => {
                let removed = engine.evict_expired();
                debug!(removed, "Sweep tick");
            }
        }

        let current = engine.version();
        version.send_if_modified(|published| {
            if *published == current {
                return false;
            }
            *published = current;
            true
        });
    }

    info!(
        version = engine.version(),
        remaining = engine.len(),
        "Host event loop stopped"
    );
    engine
}

fn apply_completion(engine: &mut Orchestrator, completion: FunctionCompletion) {
    match engine.ingest_function_result(&completion.function, &completion.result) {
        Ok(Some(instance)) => {
            debug!(
                function = %completion.function,
                id = %instance.id,
                component_type = %instance.component_type,
                "Function result ingested"
            );
        }
        Ok(None) => {}
        Err(e) => {
            warn!(
                function = %completion.function,
                error = %e,
                "Failed to ingest function result"
            );
        }
    }
}
