//! Skill descriptors and the cast protocol.
//!
//! A skill splits into an immutable catalog half ([`SkillDescriptor`]: curves,
//! costs, ranges) and a mutable per-actor half
//! ([`crate::state::SkillSlot`]: learned level and timers). The two are tied
//! together by [`SkillId`], a stable hash of the catalog name, so skill
//! references stay plain-old-data over the wire.

pub mod cast;

pub use cast::{CastError, CastOutcome, CastStarted, check_distance, check_self, check_target,
    finish_cast, start_cast};

use crate::state::{BuffId, GameTime, ItemId, stable_id};
use crate::stats::{BonusCurve, ScalingCurve};

/// Stable identifier of a skill catalog entry (hash of name).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillId(pub u64);

impl SkillId {
    pub const fn from_name(name: &str) -> Self {
        Self(stable_id(name))
    }
}

/// Weapon category a skill may require.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponCategory {
    Sword,
    Axe,
    Bow,
    Staff,
    Dagger,
}

/// Who a skill may legally be aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetPolicy {
    /// Only ever applies to the caster; an invalid selection is corrected,
    /// not rejected.
    SelfOnly,
    /// A live friendly actor; falls back to the caster when invalid.
    Ally,
    /// A live attackable actor; required, never corrected.
    Enemy,
    /// No spatial target; applies around the caster.
    Area,
}

/// What happens when a cast completes successfully.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillEffect {
    Damage {
        amount: ScalingCurve,
        /// Percent chance to stun the defender, 0-100.
        stun_chance: u32,
        stun_duration_ms: u64,
    },
    Heal {
        amount: ScalingCurve,
    },
    ApplyBuff {
        buff: BuffId,
        duration_ms: ScalingCurve,
    },
    Craft {
        output: ItemId,
        /// Skill-experience awarded per completed craft.
        skill_xp: u64,
    },
    /// No active effect; contributes `passive_bonuses` while learned.
    Passive,
}

/// Per-level upgrade gates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpgradeRule {
    /// Required actor level per skill level (next skill level × this).
    pub actor_level_per_level: u32,
    /// Skill-experience cost to reach a given level.
    pub skill_xp_cost: ScalingCurve,
}

impl Default for UpgradeRule {
    fn default() -> Self {
        Self {
            actor_level_per_level: 1,
            skill_xp_cost: ScalingCurve::flat(100.0),
        }
    }
}

/// Immutable catalog data for one skill. All numeric fields are level-scaled
/// curves evaluated at the learned level.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDescriptor {
    pub name: String,
    pub effect: SkillEffect,
    pub target: TargetPolicy,
    pub cast_time_ms: ScalingCurve,
    pub cooldown_ms: ScalingCurve,
    pub mana_cost: ScalingCurve,
    pub range: ScalingCurve,
    pub required_weapon: Option<WeaponCategory>,
    /// Abort the committed cast as soon as the target dies, rather than
    /// waiting for the finish-time re-validation.
    pub cancel_on_target_died: bool,
    /// Stat contributions while learned (passive skills only).
    pub passive_bonuses: Vec<BonusCurve>,
    pub upgrade: UpgradeRule,
    pub max_level: u32,
}

impl SkillDescriptor {
    pub fn id(&self) -> SkillId {
        SkillId::from_name(&self.name)
    }

    pub fn is_passive(&self) -> bool {
        matches!(self.effect, SkillEffect::Passive)
    }

    pub fn cast_time_at(&self, level: u32) -> u64 {
        self.cast_time_ms.rounded_at(level) as u64
    }

    pub fn cooldown_at(&self, level: u32) -> u64 {
        self.cooldown_ms.rounded_at(level) as u64
    }

    pub fn mana_cost_at(&self, level: u32) -> u32 {
        self.mana_cost.rounded_at(level)
    }

    pub fn range_at(&self, level: u32) -> f32 {
        self.range.value_at(level).max(0.0)
    }
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum UpgradeError {
    #[error("skill slot {0} does not exist")]
    NoSuchSlot(usize),

    #[error("skill is already at max level {0}")]
    AtMaxLevel(u32),

    #[error("actor level {actual} below required {required}")]
    ActorLevelTooLow { required: u32, actual: u32 },

    #[error("skill experience {actual} below cost {cost}")]
    InsufficientSkillXp { cost: u64, actual: u64 },
}

/// Raises a skill slot one level, consuming skill experience.
///
/// Gated by actor level and the accumulated skill-experience currency; both
/// gates come from the descriptor's [`UpgradeRule`].
pub fn upgrade_skill(
    actor: &mut crate::state::ActorState,
    slot_index: usize,
    descriptor: &SkillDescriptor,
) -> Result<u32, UpgradeError> {
    let slot = actor
        .skills
        .get(slot_index)
        .copied()
        .ok_or(UpgradeError::NoSuchSlot(slot_index))?;

    let next = slot.level + 1;
    if slot.level >= descriptor.max_level {
        return Err(UpgradeError::AtMaxLevel(descriptor.max_level));
    }

    let required = next * descriptor.upgrade.actor_level_per_level;
    if actor.level < required {
        return Err(UpgradeError::ActorLevelTooLow {
            required,
            actual: actor.level,
        });
    }

    let cost = descriptor.upgrade.skill_xp_cost.rounded_at(next) as u64;
    if actor.skill_experience < cost {
        return Err(UpgradeError::InsufficientSkillXp {
            cost,
            actual: actor.skill_experience,
        });
    }

    actor.skill_experience -= cost;
    if let Some(slot) = actor.skills.get_mut(slot_index) {
        slot.level = next;
    }
    Ok(next)
}

/// Remaining cast/cooldown windows expressed relative to `now`, for the
/// persistence boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillTimers {
    pub cast_remaining_ms: u64,
    pub cooldown_remaining_ms: u64,
}

impl SkillTimers {
    pub fn capture(slot: &crate::state::SkillSlot, now: GameTime) -> Self {
        Self {
            cast_remaining_ms: slot.cast_end.remaining_from(now),
            cooldown_remaining_ms: slot.cooldown_end.remaining_from(now),
        }
    }

    pub fn restore(&self, slot: &mut crate::state::SkillSlot, now: GameTime) {
        slot.cast_end = now + self.cast_remaining_ms;
        slot.cooldown_end = now + self.cooldown_remaining_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActorId, ActorKind, ActorState, SkillSlot};
    use crate::stats::BaseProfile;

    fn descriptor() -> SkillDescriptor {
        SkillDescriptor {
            name: "slash".into(),
            effect: SkillEffect::Damage {
                amount: ScalingCurve::new(10.0, 2.0),
                stun_chance: 0,
                stun_duration_ms: 0,
            },
            target: TargetPolicy::Enemy,
            cast_time_ms: ScalingCurve::flat(500.0),
            cooldown_ms: ScalingCurve::flat(1_000.0),
            mana_cost: ScalingCurve::flat(5.0),
            range: ScalingCurve::flat(2.0),
            required_weapon: None,
            cancel_on_target_died: false,
            passive_bonuses: Vec::new(),
            upgrade: UpgradeRule {
                actor_level_per_level: 5,
                skill_xp_cost: ScalingCurve::flat(100.0),
            },
            max_level: 3,
        }
    }

    fn actor_with_slot(level: u32) -> ActorState {
        let mut actor = ActorState::new(ActorId(0), ActorKind::Player, BaseProfile::default());
        actor
            .skills
            .push(SkillSlot::new(SkillId::from_name("slash"), level));
        actor
    }

    #[test]
    fn upgrade_gates_on_actor_level_and_currency() {
        let desc = descriptor();
        let mut actor = actor_with_slot(1);
        actor.level = 5;
        actor.skill_experience = 500;
        // Needs actor level 10 for skill level 2.
        assert!(matches!(
            upgrade_skill(&mut actor, 0, &desc),
            Err(UpgradeError::ActorLevelTooLow { required: 10, .. })
        ));

        actor.level = 10;
        actor.skill_experience = 50;
        assert!(matches!(
            upgrade_skill(&mut actor, 0, &desc),
            Err(UpgradeError::InsufficientSkillXp { cost: 100, .. })
        ));

        actor.skill_experience = 150;
        assert_eq!(upgrade_skill(&mut actor, 0, &desc).unwrap(), 2);
        assert_eq!(actor.skill_experience, 50);
        assert_eq!(actor.skills[0].level, 2);
    }

    #[test]
    fn upgrade_respects_max_level() {
        let desc = descriptor();
        let mut actor = actor_with_slot(3);
        actor.level = 60;
        actor.skill_experience = 10_000;
        assert_eq!(
            upgrade_skill(&mut actor, 0, &desc),
            Err(UpgradeError::AtMaxLevel(3))
        );
    }

    #[test]
    fn timers_round_trip_as_remaining_durations() {
        let mut slot = SkillSlot::new(SkillId::from_name("slash"), 1);
        slot.cast_end = GameTime::new(1_500);
        slot.cooldown_end = GameTime::new(4_000);

        let timers = SkillTimers::capture(&slot, GameTime::new(1_000));
        assert_eq!(timers.cast_remaining_ms, 500);
        assert_eq!(timers.cooldown_remaining_ms, 3_000);

        // A restart resets the absolute clock; remaining windows survive.
        let mut restored = SkillSlot::new(slot.id, slot.level);
        timers.restore(&mut restored, GameTime::new(0));
        assert_eq!(restored.cast_end, GameTime::new(500));
        assert_eq!(restored.cooldown_end, GameTime::new(3_000));
    }
}
