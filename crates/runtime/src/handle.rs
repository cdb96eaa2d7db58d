//! Cloneable façade for interacting with the running simulation.
//!
//! Hides channel plumbing and offers async helpers for issuing commands,
//! reading snapshots and streaming events from specific topics.

use tokio::sync::{broadcast, mpsc, oneshot};

use realm_core::{ActorId, Position};

use crate::command::ClientCommand;
use crate::error::{Result, RuntimeError};
use crate::events::{EventBus, SimEvent, Topic};
use crate::persist::WorldRecord;
use crate::simulation::Command;
use crate::snapshot::WorldSnapshot;

/// Client-facing handle to a running [`crate::Runtime`].
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Buffers one client command; it takes effect at the next tick.
    pub async fn apply(&self, actor: ActorId, command: ClientCommand) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::Apply {
                actor,
                command,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Spawns an actor from a named template at a position.
    pub async fn spawn(&self, template: impl Into<String>, position: Position) -> Result<ActorId> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::Spawn {
                template: template.into(),
                position,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// One consistent read-only view of the world.
    pub async fn snapshot(&self) -> Result<WorldSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Durable record of the world, for handing to a [`crate::Persistence`]
    /// store.
    pub async fn capture(&self) -> Result<WorldRecord> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(Command::Capture { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Subscribe to events from one topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<SimEvent> {
        self.event_bus.subscribe(topic)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
