//! Runtime orchestrator: builds the worker, hands out handles.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use realm_content::StaticCatalog;
use realm_core::{GameConfig, WorldState};

use crate::error::{Result, RuntimeError};
use crate::events::EventBus;
use crate::handle::RuntimeHandle;
use crate::simulation::{Command, SimulationWorker, TickEngine};

const DEFAULT_COMMAND_CAPACITY: usize = 256;

/// A running simulation: one worker task plus the channels into it.
///
/// Dropping the runtime (and every cloned handle) stops the worker.
pub struct Runtime {
    handle: RuntimeHandle,
    command_tx: mpsc::Sender<Command>,
    worker: JoinHandle<()>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::default()
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Stops the worker and waits for it. Completes even while cloned
    /// handles are still alive; their subsequent commands fail with
    /// [`RuntimeError::CommandChannelClosed`].
    pub async fn shutdown(self) -> Result<()> {
        // A send failure means the worker already exited.
        let _ = self.command_tx.send(Command::Shutdown).await;
        self.worker.await.map_err(RuntimeError::WorkerJoin)
    }
}

#[derive(Default)]
pub struct RuntimeBuilder {
    catalog: Option<Arc<StaticCatalog>>,
    config: Option<GameConfig>,
    world: Option<WorldState>,
    seed: Option<u64>,
}

impl RuntimeBuilder {
    pub fn catalog(mut self, catalog: Arc<StaticCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Starts from an existing world (e.g. restored from a record) instead
    /// of an empty one.
    pub fn world(mut self, world: WorldState) -> Self {
        self.world = Some(world);
        self
    }

    /// RNG seed for a fresh world; ignored when a world is provided.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<Runtime> {
        let catalog = self.catalog.ok_or(RuntimeError::MissingCatalog)?;
        let config = self.config.unwrap_or_default();
        let world = self
            .world
            .unwrap_or_else(|| WorldState::new(self.seed.unwrap_or(0)));

        let event_bus = EventBus::new();
        let (command_tx, command_rx) = mpsc::channel(DEFAULT_COMMAND_CAPACITY);
        let engine = TickEngine::new(world, config);
        let worker = SimulationWorker::new(engine, catalog, command_rx, event_bus.clone());

        Ok(Runtime {
            handle: RuntimeHandle::new(command_tx.clone(), event_bus),
            command_tx,
            worker: tokio::spawn(worker.run()),
        })
    }
}
