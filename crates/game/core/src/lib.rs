//! Deterministic simulation core for the authoritative game server.
//!
//! `realm-core` defines the canonical rules (actors, skills, combat, the
//! per-tick state machine) and exposes pure APIs driven by the runtime. All
//! state mutation flows through the operations in [`skill::cast`], [`combat`]
//! and [`fsm`]; supporting crates depend on the types re-exported here.
pub mod combat;
pub mod config;
pub mod env;
pub mod fsm;
pub mod reward;
pub mod skill;
pub mod state;
pub mod stats;

pub use combat::{DamageInput, DamageOutcome, DamageReport, RollSeeds, resolve_damage};
pub use config::GameConfig;
pub use env::{
    ActorTemplate, BalanceTables, BuffDescriptor, CatalogError, CatalogOracle, Env, FixedRoll,
    GameEnv, PcgRng, RngOracle, TablesOracle, compute_seed,
};
pub use fsm::{Event, EventSet, FsmError, FsmState, StateAction, Step, evaluate};
pub use reward::{LevelUps, balance_reward, grant_experience, share_reward, xp_required};
pub use skill::{
    CastError, CastOutcome, CastStarted, SkillDescriptor, SkillEffect, SkillId, SkillTimers,
    TargetPolicy, UpgradeError, UpgradeRule, WeaponCategory, finish_cast, start_cast,
    upgrade_skill,
};
pub use state::{
    ActiveCast, ActorId, ActorKind, ActorState, Buff, BuffId, BuffSet, CraftJob, GameTime,
    Inventory, ItemId, ItemSlot, PendingInput, Position, ScheduledEvent, ScheduledKind,
    SkillRequest, SkillSlot, WorldState, stable_id,
};
pub use stats::{BaseProfile, BonusCurve, ScalingCurve, StatKind, StatsSnapshot};
