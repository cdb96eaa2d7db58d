//! Persistence boundary: durable records and the store trait.
//!
//! Absolute deadlines are meaningless after a restart, so records store
//! *remaining* durations for every timer (cast, cooldown, buff, stun) and
//! restoration re-anchors them to the new clock. Records also reference
//! content by stable id only; entries whose content was removed since the
//! save are skipped with a warning rather than failing the whole load.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use realm_content::StaticCatalog;
use realm_core::{
    ActorId, ActorKind, ActorState, BaseProfile, Buff, BuffId, CatalogOracle, FsmState, GameTime,
    ItemId, Position, SkillId, SkillSlot, SkillTimers, WeaponCategory, WorldState,
};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("persistence I/O failed")]
    Io(#[from] std::io::Error),

    #[error("persistence serialization failed: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRecord {
    pub id: u64,
    pub level: u32,
    pub timers: SkillTimers,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuffRecord {
    pub id: u64,
    pub level: u32,
    pub remaining_ms: u64,
}

/// Durable form of one actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRecord {
    pub kind: ActorKind,
    pub level: u32,
    pub experience: u64,
    pub skill_experience: u64,
    pub gold: u64,
    pub health: u32,
    pub mana: u32,
    pub profile: BaseProfile,
    pub weapon: Option<WeaponCategory>,
    pub skills: Vec<SkillRecord>,
    pub buffs: Vec<BuffRecord>,
    /// Item id and count pairs.
    pub items: Vec<(u64, u32)>,
    /// State label; parsed on restore, falling back to idle when unknown.
    pub state: String,
    pub position: Position,
    pub safe_point: Position,
    pub stun_remaining_ms: u64,
}

/// Durable form of the whole world.
///
/// Actor ids are not stable across a save/load cycle; cross-actor references
/// (targets, in-flight casts) are transient combat state and deliberately not
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldRecord {
    pub seed: u64,
    pub actors: Vec<ActorRecord>,
}

impl ActorRecord {
    pub fn capture(actor: &ActorState, now: GameTime) -> Self {
        Self {
            kind: actor.kind,
            level: actor.level,
            experience: actor.experience,
            skill_experience: actor.skill_experience,
            gold: actor.gold,
            health: actor.health,
            mana: actor.mana,
            profile: actor.profile.clone(),
            weapon: actor.weapon,
            skills: actor
                .skills
                .iter()
                .map(|slot| SkillRecord {
                    id: slot.id.0,
                    level: slot.level,
                    timers: SkillTimers::capture(slot, now),
                })
                .collect(),
            buffs: actor
                .buffs
                .active_at(now)
                .map(|buff| BuffRecord {
                    id: buff.id.0,
                    level: buff.level,
                    remaining_ms: buff.expires_at.remaining_from(now),
                })
                .collect(),
            items: actor
                .inventory
                .slots()
                .iter()
                .map(|slot| (slot.item.0, slot.count))
                .collect(),
            state: actor.state.to_string(),
            position: actor.position,
            safe_point: actor.safe_point,
            stun_remaining_ms: actor.stun_until.remaining_from(now),
        }
    }

    /// Rebuilds the live actor, re-anchoring timers to `now`.
    ///
    /// Skills and buffs referencing content no longer in the catalog are
    /// dropped with a warning. An unknown state label is a data error; it is
    /// reported and the actor restarts idle.
    pub fn restore(&self, catalog: &StaticCatalog, now: GameTime) -> ActorState {
        let mut actor = ActorState::new(ActorId(0), self.kind, self.profile.clone());
        actor.level = self.level;
        actor.experience = self.experience;
        actor.skill_experience = self.skill_experience;
        actor.gold = self.gold;
        actor.health = self.health;
        actor.mana = self.mana;
        actor.weapon = self.weapon;
        actor.position = self.position;
        actor.safe_point = self.safe_point;
        actor.stun_until = now + self.stun_remaining_ms;

        actor.state = match FsmState::from_label(&self.state) {
            Ok(state) => state,
            Err(err) => {
                error!(%err, "corrupt state label in actor record, restarting idle");
                FsmState::Idle
            }
        };

        for record in &self.skills {
            let id = SkillId(record.id);
            if catalog.skill(id).is_err() {
                warn!(skill = record.id, "skipping persisted skill with no catalog entry");
                continue;
            }
            let mut slot = SkillSlot::new(id, record.level);
            record.timers.restore(&mut slot, now);
            if actor.skills.try_push(slot).is_err() {
                warn!(skill = record.id, "actor record carries too many skills");
                break;
            }
        }

        for record in &self.buffs {
            let id = BuffId(record.id);
            if catalog.buff(id).is_err() {
                warn!(buff = record.id, "skipping persisted buff with no catalog entry");
                continue;
            }
            actor.buffs.add_or_refresh(Buff {
                id,
                level: record.level,
                expires_at: now + record.remaining_ms,
            });
        }

        for &(item, count) in &self.items {
            actor.inventory.add(ItemId(item), count);
        }

        actor
    }
}

impl WorldRecord {
    pub fn capture(world: &WorldState, now: GameTime) -> Self {
        Self {
            seed: world.seed,
            actors: world
                .actor_ids()
                .into_iter()
                .filter_map(|id| world.actor(id))
                .map(|actor| ActorRecord::capture(actor, now))
                .collect(),
        }
    }

    pub fn restore(&self, catalog: &StaticCatalog, now: GameTime) -> WorldState {
        let mut world = WorldState::new(self.seed);
        for record in &self.actors {
            world.spawn(record.restore(catalog, now));
        }
        world
    }
}

/// Durable store for world records.
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn save(&self, record: &WorldRecord) -> Result<(), PersistError>;
    async fn load(&self) -> Result<Option<WorldRecord>, PersistError>;
}

/// Single-file bincode store with atomic replace.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Persistence for FileStore {
    async fn save(&self, record: &WorldRecord) -> Result<(), PersistError> {
        let bytes =
            bincode::serialize(record).map_err(|e| PersistError::Serialization(e.to_string()))?;
        let temp_path = self.path.with_extension("bin.tmp");
        tokio::fs::write(&temp_path, &bytes).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        tracing::debug!(path = %self.path.display(), actors = record.actors.len(), "saved world");
        Ok(())
    }

    async fn load(&self) -> Result<Option<WorldRecord>, PersistError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let record =
            bincode::deserialize(&bytes).map_err(|e| PersistError::Serialization(e.to_string()))?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_core::BalanceTables;

    fn catalog() -> StaticCatalog {
        StaticCatalog::new(BalanceTables::DEFAULT)
    }

    fn player() -> ActorState {
        let mut actor = ActorState::new(ActorId(0), ActorKind::Player, BaseProfile::default());
        actor.level = 7;
        actor.gold = 42;
        actor.position = Position::new(3.0, 0.0, 1.0);
        actor.stun_until = GameTime::new(4_500);
        actor
    }

    #[test]
    fn timers_restore_relative_to_the_new_clock() {
        let record = ActorRecord::capture(&player(), GameTime::new(4_000));
        assert_eq!(record.stun_remaining_ms, 500);

        let restored = record.restore(&catalog(), GameTime::new(100));
        assert_eq!(restored.stun_until, GameTime::new(600));
        assert_eq!(restored.level, 7);
        assert_eq!(restored.position, Position::new(3.0, 0.0, 1.0));
    }

    #[test]
    fn dangling_content_reference_is_skipped() {
        let mut actor = player();
        actor
            .skills
            .try_push(SkillSlot::new(SkillId::from_name("removed"), 2))
            .unwrap();
        actor.buffs.add_or_refresh(Buff {
            id: BuffId::from_name("also_removed"),
            level: 1,
            expires_at: GameTime::new(9_000),
        });

        let record = ActorRecord::capture(&actor, GameTime::ZERO);
        let restored = record.restore(&catalog(), GameTime::ZERO);
        assert!(restored.skills.is_empty());
        assert!(restored.buffs.is_empty());
    }

    #[test]
    fn corrupt_state_label_falls_back_to_idle() {
        let mut record = ActorRecord::capture(&player(), GameTime::ZERO);
        record.state = "Flying".to_string();
        let restored = record.restore(&catalog(), GameTime::ZERO);
        assert_eq!(restored.state, FsmState::Idle);
    }

    #[tokio::test]
    async fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("world.bin"));

        assert!(store.load().await.unwrap().is_none());

        let mut world = WorldState::new(7);
        world.spawn(player());
        let record = WorldRecord::capture(&world, GameTime::ZERO);
        store.save(&record).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.seed, 7);
        assert_eq!(loaded.actors.len(), 1);
        assert_eq!(loaded.actors[0].gold, 42);
    }
}
