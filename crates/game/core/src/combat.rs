//! Damage pipeline: block, defense mitigation, critical multiplier, stun
//! roll, aggro notification.
//!
//! The resolver mutates both actors inside one tick's call stack; the
//! single-threaded tick makes that race-free by construction. It assumes live
//! references — invalid actor ids are the caller's problem — and cannot fail
//! under valid input.

use crate::env::{BalanceTables, RngOracle, compute_seed, roll};
use crate::state::{ActorState, GameTime};
use crate::stats::StatsSnapshot;

/// How one resolution landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageOutcome {
    Normal,
    Block,
    Critical,
}

/// Raw damage request, before mitigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageInput {
    pub base_amount: u32,
    /// Percent chance to stun the defender, 0-100.
    pub stun_chance: u32,
    pub stun_duration_ms: u64,
}

/// Seed material for this resolution's rolls.
///
/// The world hands out one nonce per resolution; block, crit and stun each
/// mix in a distinct roll context so they draw independent values.
#[derive(Clone, Copy, Debug)]
pub struct RollSeeds {
    pub world_seed: u64,
    pub nonce: u64,
}

/// Everything downstream consumers need to react to a resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageReport {
    pub outcome: DamageOutcome,
    pub dealt: u32,
    /// Defender's health reached zero in this resolution.
    pub lethal: bool,
    pub stunned: bool,
}

/// Resolves one attack from `attacker` onto `defender`.
///
/// Pipeline order: invincibility short-circuit → block roll → defense
/// mitigation (floored at `damage_floor` so attacks are never fully
/// negated) → critical roll → clamped application → stun roll.
///
/// Regardless of the damage result, the defender's aggro hook fires with the
/// attacker as source and both actors' last-combat timestamps refresh; a
/// blocked hit is still a threat.
pub fn resolve_damage(
    attacker: &mut ActorState,
    defender: &mut ActorState,
    attacker_stats: &StatsSnapshot,
    defender_stats: &StatsSnapshot,
    input: DamageInput,
    now: GameTime,
    seeds: RollSeeds,
    tables: &BalanceTables,
    rng: &(impl RngOracle + ?Sized),
) -> DamageReport {
    let attacker_id = attacker.id;

    let report = if defender.invincible {
        // No damage, no rolls; bookkeeping below still happens.
        DamageReport {
            outcome: DamageOutcome::Normal,
            dealt: 0,
            lethal: false,
            stunned: false,
        }
    } else {
        let block_seed = compute_seed(seeds.world_seed, seeds.nonce, defender.id.0, roll::BLOCK);
        if rng.roll_chance(block_seed, defender_stats.block_chance) {
            DamageReport {
                outcome: DamageOutcome::Block,
                dealt: 0,
                lethal: false,
                stunned: false,
            }
        } else {
            let mut dealt = input
                .base_amount
                .saturating_sub(defender_stats.defense)
                .max(tables.damage_floor);

            let crit_seed = compute_seed(seeds.world_seed, seeds.nonce, attacker_id.0, roll::CRIT);
            let outcome = if rng.roll_chance(crit_seed, attacker_stats.crit_chance) {
                dealt *= tables.crit_multiplier;
                DamageOutcome::Critical
            } else {
                DamageOutcome::Normal
            };

            defender.apply_damage(dealt);

            let stun_seed = compute_seed(seeds.world_seed, seeds.nonce, defender.id.0, roll::STUN);
            let stunned = input.stun_chance > 0 && rng.roll_chance(stun_seed, input.stun_chance);
            if stunned {
                // Never shortens an already longer stun.
                defender.apply_stun(now + input.stun_duration_ms);
            }

            DamageReport {
                outcome,
                dealt,
                lethal: !defender.is_alive(),
                stunned,
            }
        }
    };

    defender.register_aggro(attacker_id);
    attacker.last_combat = now;
    defender.last_combat = now;

    report
}
