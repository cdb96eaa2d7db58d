//! Authoritative state types: identifiers, actors, buffs, inventory, world.

mod actor;
mod buff;
mod common;
mod inventory;
mod world;

pub use actor::{
    ActiveCast, ActorKind, ActorState, CraftJob, PendingInput, ScheduledEvent, ScheduledKind,
    SkillRequest, SkillSlot,
};
pub use buff::{Buff, BuffId, BuffSet};
pub use common::{ActorId, GameTime, Position, stable_id};
pub use inventory::{Inventory, ItemId, ItemSlot};
pub use world::WorldState;
