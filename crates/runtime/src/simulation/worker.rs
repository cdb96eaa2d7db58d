//! Simulation worker task: owns the engine, drives the tick, serves queries.
//!
//! All world access funnels through this task's command channel, so the
//! engine itself never needs locks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use realm_content::StaticCatalog;
use realm_core::{ActorId, Position};

use crate::command::{ClientCommand, buffer_command};
use crate::error::{Result, RuntimeError};
use crate::events::EventBus;
use crate::persist::WorldRecord;
use crate::simulation::TickEngine;
use crate::snapshot::WorldSnapshot;

/// Commands the worker accepts from [`crate::RuntimeHandle`].
pub enum Command {
    /// Buffer one client command for an actor; takes effect next tick.
    Apply {
        actor: ActorId,
        command: ClientCommand,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Instantiate a template and spawn it at a position.
    Spawn {
        template: String,
        position: Position,
        reply: oneshot::Sender<Result<ActorId>>,
    },
    /// Consistent read-only view of the world.
    Snapshot { reply: oneshot::Sender<WorldSnapshot> },
    /// Durable record of the world for persistence.
    Capture { reply: oneshot::Sender<WorldRecord> },
    /// Stop the worker loop. Commands still queued behind this one are
    /// dropped; their reply channels close.
    Shutdown,
}

/// Background task that ticks the engine and processes commands.
pub struct SimulationWorker {
    engine: TickEngine,
    catalog: Arc<StaticCatalog>,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl SimulationWorker {
    pub fn new(
        engine: TickEngine,
        catalog: Arc<StaticCatalog>,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        tracing::info!(
            actors = engine.world().len(),
            tick_ms = engine.config().tick_interval_ms,
            "simulation worker initialized"
        );
        Self {
            engine,
            catalog,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop: runs until shutdown is requested or every sender
    /// into the command channel is dropped.
    pub async fn run(mut self) {
        let mut ticker =
            tokio::time::interval(Duration::from_millis(self.engine.config().tick_interval_ms));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.engine.step(&self.catalog, &self.event_bus);
                }
                command = self.command_rx.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
            }
        }
        debug!(tick = ?self.engine.clock(), "simulation worker stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Apply {
                actor,
                command,
                reply,
            } => {
                let result = self.apply(actor, command);
                if reply.send(result).is_err() {
                    debug!("apply reply channel closed (caller dropped)");
                }
            }
            Command::Spawn {
                template,
                position,
                reply,
            } => {
                let result = self.spawn(&template, position);
                if reply.send(result).is_err() {
                    debug!("spawn reply channel closed (caller dropped)");
                }
            }
            Command::Snapshot { reply } => {
                let snapshot =
                    WorldSnapshot::capture(self.engine.world(), &self.catalog, self.engine.clock());
                if reply.send(snapshot).is_err() {
                    debug!("snapshot reply channel closed (caller dropped)");
                }
            }
            Command::Capture { reply } => {
                let record = WorldRecord::capture(self.engine.world(), self.engine.clock());
                if reply.send(record).is_err() {
                    debug!("capture reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => unreachable!("shutdown breaks the run loop"),
        }
    }

    fn apply(&mut self, id: ActorId, command: ClientCommand) -> Result<()> {
        let Some(actor) = self.engine.world_mut().actor_mut(id) else {
            return Err(RuntimeError::UnknownActor(id));
        };
        if !actor.kind.is_client_driven() {
            return Err(RuntimeError::NotClientDriven(id));
        }
        buffer_command(actor, command);
        Ok(())
    }

    fn spawn(&mut self, template: &str, position: Position) -> Result<ActorId> {
        let mut actor = self.catalog.instantiate(template)?;
        actor.position = position;
        actor.safe_point = position;
        Ok(self.engine.spawn(actor, &self.catalog))
    }
}
