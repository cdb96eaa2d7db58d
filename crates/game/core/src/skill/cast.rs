//! The three-phase cast validation and the start/finish cast lifecycle.
//!
//! Three independently composable checks — self, target, distance — each pure
//! with respect to its inputs. `start_cast` commits the actor to a timed cast
//! window without consuming anything; `finish_cast` re-runs the self and
//! target checks before applying the effect, and silently aborts (no mana, no
//! cooldown) when the world changed under the caster. That asymmetry is
//! deliberate: a target dying mid-cast is outside the caster's control and
//! must not cost them resources.

use super::{SkillDescriptor, SkillEffect, SkillId, TargetPolicy};
use crate::combat::{DamageInput, DamageReport, RollSeeds, resolve_damage};
use crate::env::{CatalogError, GameEnv};
use crate::state::{
    ActiveCast, ActorId, ActorState, Buff, GameTime, Position, SkillSlot, WorldState,
};
use crate::stats::StatsSnapshot;

/// Why a cast was rejected or aborted.
///
/// Rejections of untrusted client input are mapped to silent no-ops at the
/// runtime boundary; the typed reason exists for logs and tests.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum CastError {
    #[error("caster is not in the world")]
    MissingCaster,

    #[error("skill slot {0} does not exist")]
    NoSuchSlot(usize),

    #[error("skill is not learned")]
    NotLearned,

    #[error("skill has no castable effect")]
    NotCastable,

    #[error("caster is dead")]
    NotAlive,

    #[error("skill requires a {required} weapon")]
    MissingWeapon {
        required: crate::skill::WeaponCategory,
    },

    #[error("skill is on cooldown")]
    OnCooldown,

    #[error("a cast is already in progress")]
    StillCasting,

    #[error("insufficient mana: need {required}, have {available}")]
    InsufficientMana { required: u32, available: u32 },

    #[error("invalid target")]
    InvalidTarget,

    #[error("target is dead")]
    TargetDead,

    #[error("target out of range: {distance:.1} > {range:.1}")]
    OutOfRange { distance: f32, range: f32 },

    #[error("no cast in flight")]
    NoActiveCast,

    #[error(transparent)]
    UnknownSkill(#[from] CatalogError),
}

/// Confirmation returned by [`start_cast`] for observer notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CastStarted {
    pub skill: SkillId,
    pub target: Option<ActorId>,
    pub cast_end: GameTime,
    /// Destination point computed by the distance check.
    pub destination: Position,
}

/// Terminal result of [`finish_cast`].
///
/// An abort is a normal control-flow outcome, not an error: nothing was
/// consumed and no cooldown started.
#[derive(Clone, Debug, PartialEq)]
pub enum CastOutcome {
    Applied {
        skill: SkillId,
        target: Option<ActorId>,
        damage: Option<DamageReport>,
    },
    Aborted {
        skill: SkillId,
        reason: CastError,
    },
}

/// Self-check: the caster can legally use this skill right now.
///
/// `bypass_timers` is set during finish-time re-validation, where the cast
/// timer is by definition still "running" from the start-time perspective.
pub fn check_self(
    actor: &ActorState,
    stats: &StatsSnapshot,
    slot: &SkillSlot,
    descriptor: &SkillDescriptor,
    bypass_timers: bool,
    now: GameTime,
) -> Result<(), CastError> {
    if !actor.is_alive() {
        return Err(CastError::NotAlive);
    }
    if !slot.is_learned() {
        return Err(CastError::NotLearned);
    }
    if matches!(
        descriptor.effect,
        SkillEffect::Passive | SkillEffect::Craft { .. }
    ) {
        return Err(CastError::NotCastable);
    }
    if let Some(required) = descriptor.required_weapon {
        if actor.weapon != Some(required) {
            return Err(CastError::MissingWeapon { required });
        }
    }
    if !bypass_timers {
        if !slot.cooldown_end.elapsed_at(now) {
            return Err(CastError::OnCooldown);
        }
        if !slot.cast_end.elapsed_at(now) {
            return Err(CastError::StillCasting);
        }
    }
    let required = descriptor.mana_cost_at(slot.level);
    if stats.mana < required {
        return Err(CastError::InsufficientMana {
            required,
            available: stats.mana,
        });
    }
    Ok(())
}

/// Target-check: validates and potentially *corrects* the target.
///
/// A self-only skill aimed at anything (or nothing) retargets to the caster;
/// an ally skill falls back to the caster when the selection is invalid. The
/// correction is a deliberate fallback, not an error. Enemy targets are never
/// corrected.
pub fn check_target(
    world: &WorldState,
    caster: ActorId,
    requested: Option<ActorId>,
    policy: TargetPolicy,
) -> Result<Option<ActorId>, CastError> {
    match policy {
        TargetPolicy::SelfOnly => Ok(Some(caster)),
        TargetPolicy::Area => Ok(None),
        TargetPolicy::Ally => {
            let valid = requested
                .and_then(|id| world.actor(id))
                .filter(|actor| actor.is_alive())
                .map(|actor| actor.id);
            Ok(Some(valid.unwrap_or(caster)))
        }
        TargetPolicy::Enemy => {
            let id = requested.ok_or(CastError::InvalidTarget)?;
            if id == caster {
                return Err(CastError::InvalidTarget);
            }
            let target = world.actor(id).ok_or(CastError::InvalidTarget)?;
            if !target.kind.can_attack() {
                return Err(CastError::InvalidTarget);
            }
            if !target.is_alive() {
                return Err(CastError::TargetDead);
            }
            Ok(Some(id))
        }
    }
}

/// Distance-check: computes the destination point and verifies range.
///
/// Skills with no spatial target (self/area) always succeed and return the
/// caster's own position.
pub fn check_distance(
    caster_position: &Position,
    target: Option<&ActorState>,
    range: f32,
) -> Result<Position, CastError> {
    let Some(target) = target else {
        return Ok(*caster_position);
    };
    let distance = caster_position.distance(&target.position);
    if distance > range {
        return Err(CastError::OutOfRange { distance, range });
    }
    Ok(target.position)
}

/// Validates all three checks and commits the caster to the cast window.
///
/// Sets `cast_end = now + cast_time` and records the in-flight cast. No
/// resource is consumed and no cooldown starts; that happens only on a
/// successful finish.
pub fn start_cast(
    world: &mut WorldState,
    caster_id: ActorId,
    slot_index: usize,
    requested_target: Option<ActorId>,
    now: GameTime,
    env: &GameEnv<'_>,
) -> Result<CastStarted, CastError> {
    let caster = world.actor(caster_id).ok_or(CastError::MissingCaster)?;
    let slot = *caster
        .skill_slot(slot_index)
        .ok_or(CastError::NoSuchSlot(slot_index))?;
    let descriptor = env.catalog.skill(slot.id)?;
    let stats = StatsSnapshot::compute(caster, env.catalog, now);

    check_self(caster, &stats, &slot, descriptor, false, now)?;
    let target = check_target(world, caster_id, requested_target, descriptor.target)?;

    let spatial_target = target
        .filter(|&id| id != caster_id)
        .and_then(|id| world.actor(id));
    let destination = check_distance(
        &caster.position,
        spatial_target,
        descriptor.range_at(slot.level),
    )?;

    let cast_end = now + descriptor.cast_time_at(slot.level);
    let cancel_on_target_died = descriptor.cancel_on_target_died;

    // Checks passed: commitment is irrevocable until finish or a modeled
    // cancellation event (stun, death, explicit cancel).
    let caster = world
        .actor_mut(caster_id)
        .ok_or(CastError::MissingCaster)?;
    if let Some(slot) = caster.skill_slot_mut(slot_index) {
        slot.cast_end = cast_end;
    }
    caster.cast = Some(ActiveCast {
        slot: slot_index,
        target,
        started_at: now,
        cast_end,
        cancel_on_target_died,
    });

    Ok(CastStarted {
        skill: slot.id,
        target,
        cast_end,
        destination,
    })
}

/// Completes the in-flight cast: re-validate, then apply or silently abort.
///
/// The in-flight cast reference is cleared *first*, so a stale slot index can
/// never leak into the next tick's skill-requested check. Only a successful
/// application consumes mana and starts the cooldown.
pub fn finish_cast(
    world: &mut WorldState,
    caster_id: ActorId,
    now: GameTime,
    env: &GameEnv<'_>,
) -> Result<CastOutcome, CastError> {
    let cast = world
        .actor_mut(caster_id)
        .ok_or(CastError::MissingCaster)?
        .cast
        .take()
        .ok_or(CastError::NoActiveCast)?;

    let caster = world.actor(caster_id).ok_or(CastError::MissingCaster)?;
    let slot = *caster
        .skill_slot(cast.slot)
        .ok_or(CastError::NoSuchSlot(cast.slot))?;
    let descriptor = env.catalog.skill(slot.id)?;
    let skill = slot.id;
    let stats = StatsSnapshot::compute(caster, env.catalog, now);

    // Re-validation: the resource pool or the target may have changed during
    // the cast window. Failure is a cost-free abort, not an error.
    if let Err(reason) = check_self(caster, &stats, &slot, descriptor, true, now) {
        return Ok(CastOutcome::Aborted { skill, reason });
    }
    let target = match check_target(world, caster_id, cast.target, descriptor.target) {
        Ok(target) => target,
        Err(reason) => return Ok(CastOutcome::Aborted { skill, reason }),
    };

    let mana_cost = descriptor.mana_cost_at(slot.level);
    let cooldown_end = now + descriptor.cooldown_at(slot.level);
    let effect = descriptor.effect.clone();
    let level = slot.level;

    {
        let caster = world
            .actor_mut(caster_id)
            .ok_or(CastError::MissingCaster)?;
        if !caster.spend_mana(mana_cost) {
            return Ok(CastOutcome::Aborted {
                skill,
                reason: CastError::InsufficientMana {
                    required: mana_cost,
                    available: caster.mana,
                },
            });
        }
        if let Some(slot) = caster.skill_slot_mut(cast.slot) {
            slot.cooldown_end = cooldown_end;
        }
    }

    let damage = apply_effect(world, caster_id, target, &effect, level, now, env);

    Ok(CastOutcome::Applied {
        skill,
        target,
        damage,
    })
}

fn apply_effect(
    world: &mut WorldState,
    caster_id: ActorId,
    target: Option<ActorId>,
    effect: &SkillEffect,
    level: u32,
    now: GameTime,
    env: &GameEnv<'_>,
) -> Option<DamageReport> {
    match effect {
        SkillEffect::Damage {
            amount,
            stun_chance,
            stun_duration_ms,
        } => {
            let defender_id = target?;
            let attacker_stats = StatsSnapshot::compute(world.actor(caster_id)?, env.catalog, now);
            let defender_stats =
                StatsSnapshot::compute(world.actor(defender_id)?, env.catalog, now);
            let seeds = RollSeeds {
                world_seed: world.seed,
                nonce: world.next_nonce(),
            };
            let (attacker, defender) = world.pair_mut(caster_id, defender_id)?;
            Some(resolve_damage(
                attacker,
                defender,
                &attacker_stats,
                &defender_stats,
                DamageInput {
                    base_amount: attacker_stats.damage + amount.rounded_at(level),
                    stun_chance: *stun_chance,
                    stun_duration_ms: *stun_duration_ms,
                },
                now,
                seeds,
                &env.tables.balance(),
                env.rng,
            ))
        }
        SkillEffect::Heal { amount } => {
            let target_id = target.unwrap_or(caster_id);
            let target_stats = StatsSnapshot::compute(world.actor(target_id)?, env.catalog, now);
            let healed = amount.rounded_at(level);
            world
                .actor_mut(target_id)?
                .heal(healed, target_stats.max_health);
            None
        }
        SkillEffect::ApplyBuff { buff, duration_ms } => {
            let target_id = target.unwrap_or(caster_id);
            let expires_at = now + duration_ms.rounded_at(level) as u64;
            world.actor_mut(target_id)?.buffs.add_or_refresh(Buff {
                id: *buff,
                level,
                expires_at,
            });
            None
        }
        // Craft and passive skills never reach here; check_self rejects them.
        SkillEffect::Craft { .. } | SkillEffect::Passive => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{
        ActorTemplate, BalanceTables, BuffDescriptor, CatalogOracle, Env, PcgRng,
    };
    use crate::skill::UpgradeRule;
    use crate::state::{ActorKind, BuffId};
    use crate::stats::{BaseProfile, ScalingCurve};

    struct TestCatalog {
        skills: Vec<SkillDescriptor>,
    }

    impl CatalogOracle for TestCatalog {
        fn skill(&self, id: SkillId) -> Result<&SkillDescriptor, CatalogError> {
            self.skills
                .iter()
                .find(|s| s.id() == id)
                .ok_or(CatalogError::MissingSkill(id.0))
        }

        fn buff(&self, id: BuffId) -> Result<&BuffDescriptor, CatalogError> {
            Err(CatalogError::MissingBuff(id.0))
        }

        fn template(&self, name: &str) -> Result<&ActorTemplate, CatalogError> {
            Err(CatalogError::MissingTemplate(name.to_string()))
        }
    }

    fn heal_skill() -> SkillDescriptor {
        SkillDescriptor {
            name: "mend".into(),
            effect: SkillEffect::Heal {
                amount: ScalingCurve::flat(30.0),
            },
            target: TargetPolicy::Ally,
            cast_time_ms: ScalingCurve::flat(2_000.0),
            cooldown_ms: ScalingCurve::flat(5_000.0),
            mana_cost: ScalingCurve::flat(20.0),
            range: ScalingCurve::flat(10.0),
            required_weapon: None,
            cancel_on_target_died: true,
            passive_bonuses: Vec::new(),
            upgrade: UpgradeRule::default(),
            max_level: 5,
        }
    }

    fn bolt_skill() -> SkillDescriptor {
        SkillDescriptor {
            name: "bolt".into(),
            effect: SkillEffect::Damage {
                amount: ScalingCurve::flat(15.0),
                stun_chance: 0,
                stun_duration_ms: 0,
            },
            target: TargetPolicy::Enemy,
            cast_time_ms: ScalingCurve::flat(1_000.0),
            cooldown_ms: ScalingCurve::flat(2_000.0),
            mana_cost: ScalingCurve::flat(10.0),
            range: ScalingCurve::flat(20.0),
            required_weapon: None,
            cancel_on_target_died: false,
            passive_bonuses: Vec::new(),
            upgrade: UpgradeRule::default(),
            max_level: 5,
        }
    }

    fn world_with_caster(skill: &SkillDescriptor) -> (WorldState, ActorId) {
        let mut world = WorldState::new(99);
        let profile = BaseProfile {
            max_health: ScalingCurve::flat(100.0),
            max_mana: ScalingCurve::flat(50.0),
            ..BaseProfile::default()
        };
        let mut caster = ActorState::new(ActorId(0), ActorKind::Player, profile);
        caster
            .skills
            .push(crate::state::SkillSlot::new(skill.id(), 1));
        let id = world.spawn(caster);
        (world, id)
    }

    fn spawn_enemy(world: &mut WorldState, health: u32) -> ActorId {
        let profile = BaseProfile {
            max_health: ScalingCurve::flat(health as f32),
            ..BaseProfile::default()
        };
        world.spawn(ActorState::new(
            ActorId(0),
            ActorKind::Hostile,
            profile,
        ))
    }

    #[test]
    fn start_consumes_nothing() {
        let catalog = TestCatalog {
            skills: vec![heal_skill()],
        };
        let tables = BalanceTables::DEFAULT;
        let (mut world, caster) = world_with_caster(&heal_skill());
        let env = Env::new(&catalog, &tables, &PcgRng).as_game_env();

        let started = start_cast(&mut world, caster, 0, None, GameTime::ZERO, &env).unwrap();
        assert_eq!(started.cast_end, GameTime::new(2_000));
        // Ally policy with no selection corrects to the caster.
        assert_eq!(started.target, Some(caster));
        assert_eq!(world.actor(caster).unwrap().mana, 50);
        assert!(world.actor(caster).unwrap().cast.is_some());
    }

    #[test]
    fn finish_heals_and_charges() {
        let catalog = TestCatalog {
            skills: vec![heal_skill()],
        };
        let tables = BalanceTables::DEFAULT;
        let (mut world, caster) = world_with_caster(&heal_skill());
        world.actor_mut(caster).unwrap().health = 40;
        let env = Env::new(&catalog, &tables, &PcgRng).as_game_env();

        start_cast(&mut world, caster, 0, None, GameTime::ZERO, &env).unwrap();
        let outcome = finish_cast(&mut world, caster, GameTime::new(2_000), &env).unwrap();

        assert!(matches!(outcome, CastOutcome::Applied { .. }));
        let actor = world.actor(caster).unwrap();
        assert_eq!(actor.health, 70);
        assert_eq!(actor.mana, 30);
        assert_eq!(actor.cast, None);
        assert_eq!(actor.skills[0].cooldown_end, GameTime::new(7_000));
    }

    #[test]
    fn finish_with_drained_mana_aborts_free_of_charge() {
        let catalog = TestCatalog {
            skills: vec![heal_skill()],
        };
        let tables = BalanceTables::DEFAULT;
        let (mut world, caster) = world_with_caster(&heal_skill());
        let env = Env::new(&catalog, &tables, &PcgRng).as_game_env();

        start_cast(&mut world, caster, 0, None, GameTime::ZERO, &env).unwrap();
        // Another effect drains the pool mid-cast.
        world.actor_mut(caster).unwrap().mana = 5;
        let outcome = finish_cast(&mut world, caster, GameTime::new(2_000), &env).unwrap();

        assert!(matches!(
            outcome,
            CastOutcome::Aborted {
                reason: CastError::InsufficientMana { .. },
                ..
            }
        ));
        let actor = world.actor(caster).unwrap();
        assert_eq!(actor.mana, 5);
        // No cooldown started.
        assert_eq!(actor.skills[0].cooldown_end, GameTime::ZERO);
    }

    #[test]
    fn finish_against_dead_target_aborts() {
        let catalog = TestCatalog {
            skills: vec![bolt_skill()],
        };
        let tables = BalanceTables::DEFAULT;
        let (mut world, caster) = world_with_caster(&bolt_skill());
        let enemy = spawn_enemy(&mut world, 50);
        let env = Env::new(&catalog, &tables, &PcgRng).as_game_env();

        start_cast(&mut world, caster, 0, Some(enemy), GameTime::ZERO, &env).unwrap();
        world.actor_mut(enemy).unwrap().health = 0;
        let outcome = finish_cast(&mut world, caster, GameTime::new(1_000), &env).unwrap();

        assert!(matches!(
            outcome,
            CastOutcome::Aborted {
                reason: CastError::TargetDead,
                ..
            }
        ));
        assert_eq!(world.actor(caster).unwrap().mana, 50);
    }

    #[test]
    fn enemy_target_is_never_corrected() {
        let catalog = TestCatalog {
            skills: vec![bolt_skill()],
        };
        let tables = BalanceTables::DEFAULT;
        let (mut world, caster) = world_with_caster(&bolt_skill());
        let env = Env::new(&catalog, &tables, &PcgRng).as_game_env();

        let result = start_cast(&mut world, caster, 0, None, GameTime::ZERO, &env);
        assert_eq!(result.unwrap_err(), CastError::InvalidTarget);
    }

    #[test]
    fn out_of_range_target_rejected_at_start() {
        let catalog = TestCatalog {
            skills: vec![bolt_skill()],
        };
        let tables = BalanceTables::DEFAULT;
        let (mut world, caster) = world_with_caster(&bolt_skill());
        let enemy = spawn_enemy(&mut world, 50);
        world.actor_mut(enemy).unwrap().position = Position::new(100.0, 0.0, 0.0);
        let env = Env::new(&catalog, &tables, &PcgRng).as_game_env();

        let result = start_cast(&mut world, caster, 0, Some(enemy), GameTime::ZERO, &env);
        // The rejection carries the measured values and compares by them.
        assert_eq!(
            result.unwrap_err(),
            CastError::OutOfRange {
                distance: 100.0,
                range: 20.0,
            }
        );
    }

    #[test]
    fn out_of_range_skill_index_is_a_typed_rejection() {
        let catalog = TestCatalog {
            skills: vec![bolt_skill()],
        };
        let tables = BalanceTables::DEFAULT;
        let (mut world, caster) = world_with_caster(&bolt_skill());
        let env = Env::new(&catalog, &tables, &PcgRng).as_game_env();

        let result = start_cast(&mut world, caster, 7, None, GameTime::ZERO, &env);
        assert_eq!(result.unwrap_err(), CastError::NoSuchSlot(7));
    }
}
