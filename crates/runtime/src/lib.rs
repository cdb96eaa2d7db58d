//! Runtime orchestration for the authoritative game simulation.
//!
//! Wires the tick engine, content catalog, event bus and persistence into a
//! cohesive async runtime. Embedders build a [`Runtime`], spawn actors, and
//! interact with the world through [`RuntimeHandle`]: commands are buffered
//! into per-actor input and consumed at the next fixed tick, snapshots and
//! events stream back out.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`simulation`] owns the world and runs the tick phases
//! - [`command`] defines client input and its buffering
//! - [`events`] provides the topic-based event bus
//! - [`snapshot`] produces consistent read-only views
//! - [`persist`] defines durable records and stores

pub mod command;
pub mod error;
pub mod events;
pub mod persist;
pub mod runtime;
pub mod simulation;
pub mod snapshot;

mod handle;

pub use command::ClientCommand;
pub use error::{Result, RuntimeError};
pub use events::{EventBus, SimEvent, Topic};
pub use handle::RuntimeHandle;
pub use persist::{ActorRecord, FileStore, PersistError, Persistence, WorldRecord};
pub use runtime::{Runtime, RuntimeBuilder};
pub use simulation::TickEngine;
pub use snapshot::{ActorView, CastView, WorldSnapshot};
