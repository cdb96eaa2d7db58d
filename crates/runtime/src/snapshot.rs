//! Read-only view of the world for clients and tooling.
//!
//! Snapshots are taken inside the simulation worker, so they are internally
//! consistent: all derived values come from the same tick's state.

use serde::{Deserialize, Serialize};

use realm_content::StaticCatalog;
use realm_core::{
    ActorKind, CatalogOracle, FsmState, GameTime, Position, SkillId, StatsSnapshot, WorldState,
};

/// Cast-bar state of one in-flight cast.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CastView {
    pub skill: SkillId,
    /// Progress in `[0, 1]`.
    pub progress: f32,
    pub remaining_ms: u64,
}

/// Client-facing view of one actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorView {
    pub id: realm_core::ActorId,
    pub kind: ActorKind,
    pub state: FsmState,
    pub level: u32,
    pub position: Position,
    pub health: u32,
    pub max_health: u32,
    pub mana: u32,
    pub max_mana: u32,
    pub cast: Option<CastView>,
    /// Active buff ids with remaining milliseconds.
    pub buffs: Vec<(u64, u64)>,
}

/// One consistent view of the whole world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: GameTime,
    pub actors: Vec<ActorView>,
}

impl WorldSnapshot {
    pub fn capture(world: &WorldState, catalog: &StaticCatalog, now: GameTime) -> Self {
        let actors = world
            .actor_ids()
            .into_iter()
            .filter_map(|id| {
                let actor = world.actor(id)?;
                let stats = StatsSnapshot::compute(actor, catalog as &dyn CatalogOracle, now);
                let cast = actor.cast.map(|cast| CastView {
                    skill: actor
                        .skill_slot(cast.slot)
                        .map(|slot| slot.id)
                        .unwrap_or(SkillId(0)),
                    progress: cast.progress(now),
                    remaining_ms: cast.cast_end.remaining_from(now),
                });
                Some(ActorView {
                    id: actor.id,
                    kind: actor.kind,
                    state: actor.state,
                    level: actor.level,
                    position: actor.position,
                    health: stats.health,
                    max_health: stats.max_health,
                    mana: stats.mana,
                    max_mana: stats.max_mana,
                    cast,
                    buffs: actor
                        .buffs
                        .active_at(now)
                        .map(|b| (b.id.0, b.expires_at.remaining_from(now)))
                        .collect(),
                })
            })
            .collect();

        Self { time: now, actors }
    }

    pub fn actor(&self, id: realm_core::ActorId) -> Option<&ActorView> {
        self.actors.iter().find(|a| a.id == id)
    }
}
