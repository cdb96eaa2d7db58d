//! Actor state: the per-entity record the whole simulation revolves around.
//!
//! # Design Principles
//!
//! 1. **Single writer for `state`**: only the FSM transition engine assigns
//!    the state label; resolvers and reward code mutate numeric fields only.
//! 2. **Capability composition over inheritance**: every actor kind shares
//!    this one record, with per-kind behavior expressed as [`ActorKind`]
//!    capability queries.
//! 3. **Recompute, never cache**: maximums and derived stats come from
//!    [`crate::stats::StatsSnapshot`] on demand.

use arrayvec::ArrayVec;

use super::buff::BuffSet;
use super::common::{ActorId, GameTime, Position};
use super::inventory::{Inventory, ItemId};
use crate::config::GameConfig;
use crate::fsm::{EventSet, FsmState};
use crate::skill::{SkillId, WeaponCategory};
use crate::stats::BaseProfile;

/// Concrete actor variants sharing the state-machine/resource contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActorKind {
    /// Player-controlled character (full seven-state machine).
    Player,
    /// Hostile AI-driven actor.
    Hostile,
    /// Stationary dialogue NPC; never fights, never moves.
    Dialogue,
    /// Owned combat companion.
    Companion,
    /// Owned mount; carries, never fights.
    Mount,
}

impl ActorKind {
    /// Whether this kind participates in combat at all.
    pub fn can_attack(&self) -> bool {
        match self {
            ActorKind::Player | ActorKind::Hostile | ActorKind::Companion => true,
            ActorKind::Dialogue | ActorKind::Mount => false,
        }
    }

    /// Whether this kind accepts client commands (vs. server AI only).
    pub fn is_client_driven(&self) -> bool {
        matches!(self, ActorKind::Player)
    }

    /// Whether this kind may enter the trade/craft states.
    pub fn can_trade(&self) -> bool {
        matches!(self, ActorKind::Player)
    }
}

/// Mutable state of one equipped/learned skill.
///
/// The immutable half (curves, costs, ranges) lives in the catalog and is
/// looked up by [`SkillId`]. Level 0 means the slot exists but is unlearned.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillSlot {
    pub id: SkillId,
    pub level: u32,
    pub cast_end: GameTime,
    pub cooldown_end: GameTime,
}

impl SkillSlot {
    pub fn new(id: SkillId, level: u32) -> Self {
        Self {
            id,
            level,
            cast_end: GameTime::ZERO,
            cooldown_end: GameTime::ZERO,
        }
    }

    pub fn is_learned(&self) -> bool {
        self.level > 0
    }

    /// Both the cooldown and the cast timer must have elapsed.
    pub fn timers_ready(&self, now: GameTime) -> bool {
        self.cooldown_end.elapsed_at(now) && self.cast_end.elapsed_at(now)
    }
}

/// The committed cast window between start and finish.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveCast {
    pub slot: usize,
    pub target: Option<ActorId>,
    pub started_at: GameTime,
    pub cast_end: GameTime,
    /// Abort the cast the moment the target dies, instead of waiting for the
    /// finish-time re-validation to catch it.
    pub cancel_on_target_died: bool,
}

impl ActiveCast {
    /// Cast-bar ratio in `[0, 1]` for UI consumers.
    pub fn progress(&self, now: GameTime) -> f32 {
        let total = self.cast_end.0.saturating_sub(self.started_at.0);
        if total == 0 {
            return 1.0;
        }
        let elapsed = now.0.saturating_sub(self.started_at.0).min(total);
        elapsed as f32 / total as f32
    }
}

/// An in-progress craft, finished when its deadline passes.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CraftJob {
    pub output: ItemId,
    /// Skill-experience currency awarded on completion.
    pub skill_xp: u64,
    pub finish_at: GameTime,
}

/// Deterministic per-actor scheduled event, checked once per tick.
///
/// Replaces engine-level delayed callbacks: all timing is polled against the
/// tick clock, so a missed tick resolves late rather than firing spuriously.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledEvent {
    pub due: GameTime,
    pub kind: ScheduledKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScheduledKind {
    /// Automatic respawn after the configured delay.
    Respawn,
    /// Out-of-combat hp/mp recovery pulse; reschedules itself while alive.
    RecoveryPulse,
}

/// Client/AI input buffered for the next tick.
///
/// Commands arriving through the transport are flattened into this structure
/// and only consumed at the next tick evaluation, never mid-evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingInput {
    /// Transient tick input; never persisted.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub events: EventSet,
    pub move_to: Option<Position>,
    pub skill_request: Option<SkillRequest>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillRequest {
    pub slot: usize,
    pub target: Option<ActorId>,
}

impl PendingInput {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Complete authoritative state of one actor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorState {
    pub id: ActorId,
    pub kind: ActorKind,

    // === Progression ===
    pub level: u32,
    pub experience: u64,
    /// Accumulated currency spent on skill upgrades.
    pub skill_experience: u64,
    pub gold: u64,

    // === Resources (current values; maximums are recomputed) ===
    pub health: u32,
    pub mana: u32,
    pub profile: BaseProfile,

    // === Skills & buffs ===
    pub skills: ArrayVec<SkillSlot, { GameConfig::MAX_SKILLS }>,
    pub buffs: BuffSet,
    pub inventory: Inventory,
    /// Equipped weapon category, checked by skills that require one. The item
    /// catalog itself is external; only the category matters here.
    pub weapon: Option<WeaponCategory>,

    // === FSM (written only by the transition engine) ===
    pub state: FsmState,
    pub pending: PendingInput,

    // === Combat ===
    /// Lookup-only reference; the target may despawn at any time.
    pub target: Option<ActorId>,
    pub stun_until: GameTime,
    pub cast: Option<ActiveCast>,
    pub craft: Option<CraftJob>,
    pub last_combat: GameTime,
    pub invincible: bool,

    // === Locomotion ===
    pub position: Position,
    pub destination: Option<Position>,
    /// Respawn anchor; the nearest safe point maintained by collaborators.
    pub safe_point: Position,

    // === Timers ===
    pub scheduled: Vec<ScheduledEvent>,
}

impl ActorState {
    pub fn new(id: ActorId, kind: ActorKind, profile: BaseProfile) -> Self {
        let health = profile.max_health.rounded_at(1);
        let mana = profile.max_mana.rounded_at(1);
        Self {
            id,
            kind,
            level: 1,
            experience: 0,
            skill_experience: 0,
            gold: 0,
            health,
            mana,
            profile,
            skills: ArrayVec::new(),
            buffs: BuffSet::empty(),
            inventory: Inventory::empty(),
            weapon: None,
            state: FsmState::Idle,
            pending: PendingInput::default(),
            target: None,
            stun_until: GameTime::ZERO,
            cast: None,
            craft: None,
            last_combat: GameTime::ZERO,
            invincible: false,
            position: Position::ORIGIN,
            destination: None,
            safe_point: Position::ORIGIN,
            scheduled: Vec::new(),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_stunned(&self, now: GameTime) -> bool {
        !self.stun_until.elapsed_at(now)
    }

    /// Subtracts health, clamped at zero. Maximums never matter here because
    /// current health only moves down.
    pub fn apply_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Adds health, clamped to the given maximum.
    pub fn heal(&mut self, amount: u32, max_health: u32) {
        self.health = self.health.saturating_add(amount).min(max_health);
    }

    /// Spends mana; returns false (and spends nothing) if short.
    pub fn spend_mana(&mut self, amount: u32) -> bool {
        if self.mana < amount {
            return false;
        }
        self.mana -= amount;
        true
    }

    pub fn restore_mana(&mut self, amount: u32, max_mana: u32) {
        self.mana = self.mana.saturating_add(amount).min(max_mana);
    }

    /// Clamps current resources into `[0, max]` after maximums changed
    /// (buff expired, level changed).
    pub fn clamp_resources(&mut self, max_health: u32, max_mana: u32) {
        self.health = self.health.min(max_health);
        self.mana = self.mana.min(max_mana);
    }

    /// Extends the stun window, never shortening an existing longer stun.
    pub fn apply_stun(&mut self, until: GameTime) {
        self.stun_until = self.stun_until.max(until);
    }

    /// Aggro hook: an attacked defender registers the threat even when the
    /// damage itself was blocked.
    pub fn register_aggro(&mut self, attacker: ActorId) {
        if self.kind.can_attack() && self.target.is_none() {
            self.target = Some(attacker);
        }
    }

    /// Death cleanup: clears buffs, target, in-flight cast, craft and
    /// movement. Runs exactly once, on the transition into `Dead`.
    pub fn death_cleanup(&mut self) {
        self.buffs.clear();
        self.target = None;
        self.cast = None;
        self.craft = None;
        self.destination = None;
        self.stun_until = GameTime::ZERO;
    }

    /// Respawn: restore a fraction of max health, reset to the safe point.
    pub fn respawn(&mut self, max_health: u32, max_mana: u32, health_fraction: f32) {
        let fraction = health_fraction.clamp(0.0, 1.0);
        self.health = ((max_health as f32 * fraction).round() as u32).max(1);
        self.mana = ((max_mana as f32 * fraction).round() as u32).min(max_mana);
        self.position = self.safe_point;
        self.destination = None;
    }

    /// Queues a deterministic scheduled event.
    pub fn schedule(&mut self, due: GameTime, kind: ScheduledKind) {
        self.scheduled.push(ScheduledEvent { due, kind });
    }

    /// Removes and returns every scheduled event due at `now`.
    pub fn take_due(&mut self, now: GameTime) -> Vec<ScheduledEvent> {
        let mut due = Vec::new();
        let mut index = 0;
        while index < self.scheduled.len() {
            if self.scheduled[index].due.elapsed_at(now) {
                due.push(self.scheduled.swap_remove(index));
            } else {
                index += 1;
            }
        }
        due
    }

    pub fn skill_slot(&self, index: usize) -> Option<&SkillSlot> {
        self.skills.get(index)
    }

    pub fn skill_slot_mut(&mut self, index: usize) -> Option<&mut SkillSlot> {
        self.skills.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> ActorState {
        let profile = BaseProfile {
            max_health: crate::stats::ScalingCurve::new(100.0, 10.0),
            max_mana: crate::stats::ScalingCurve::new(50.0, 5.0),
            ..BaseProfile::default()
        };
        ActorState::new(ActorId(1), ActorKind::Player, profile)
    }

    #[test]
    fn stun_never_shortens() {
        let mut a = actor();
        a.apply_stun(GameTime::new(5_000));
        a.apply_stun(GameTime::new(2_000));
        assert_eq!(a.stun_until, GameTime::new(5_000));
        a.apply_stun(GameTime::new(7_000));
        assert_eq!(a.stun_until, GameTime::new(7_000));
    }

    #[test]
    fn oversized_recovery_saturates_at_the_clamp() {
        let mut a = actor();
        a.health = 10;
        a.heal(u32::MAX, 100);
        assert_eq!(a.health, 100);
        a.mana = 10;
        a.restore_mana(u32::MAX, 50);
        assert_eq!(a.mana, 50);
    }

    #[test]
    fn dialogue_actor_rejects_aggro() {
        let mut npc = actor();
        npc.kind = ActorKind::Dialogue;
        npc.register_aggro(ActorId(9));
        assert_eq!(npc.target, None);
    }

    #[test]
    fn death_cleanup_clears_combat_state() {
        let mut a = actor();
        a.target = Some(ActorId(2));
        a.stun_until = GameTime::new(99);
        a.cast = Some(ActiveCast {
            slot: 0,
            target: None,
            started_at: GameTime::ZERO,
            cast_end: GameTime::new(1_000),
            cancel_on_target_died: false,
        });
        a.death_cleanup();
        assert_eq!(a.target, None);
        assert_eq!(a.cast, None);
        assert!(a.buffs.is_empty());
    }

    #[test]
    fn take_due_drains_only_elapsed() {
        let mut a = actor();
        a.schedule(GameTime::new(100), ScheduledKind::Respawn);
        a.schedule(GameTime::new(500), ScheduledKind::RecoveryPulse);
        let due = a.take_due(GameTime::new(200));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].kind, ScheduledKind::Respawn);
        assert_eq!(a.scheduled.len(), 1);
    }

    #[test]
    fn cast_progress_ratio() {
        let cast = ActiveCast {
            slot: 0,
            target: None,
            started_at: GameTime::new(1_000),
            cast_end: GameTime::new(3_000),
            cancel_on_target_died: false,
        };
        assert_eq!(cast.progress(GameTime::new(1_000)), 0.0);
        assert_eq!(cast.progress(GameTime::new(2_000)), 0.5);
        assert_eq!(cast.progress(GameTime::new(9_000)), 1.0);
    }
}
