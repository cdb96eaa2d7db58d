//! Experience/gold reward scaling and group sharing.
//!
//! Rewards scale with the level delta between source and receiver, bounded to
//! ±100%: under-leveled characters earn more, over-leveled characters earn
//! nothing past a twenty-level gap. Group shares use a ceiling split so the
//! group in aggregate never receives less than the base reward (it may
//! receive slightly more; that overshoot is intentional anti-loss behavior).

use crate::env::BalanceTables;
use crate::state::ActorState;

/// Scales a base reward by the receiver/source level delta.
///
/// `multiplier = 1 + clamp(source − receiver, ±clamp) × step`, with the final
/// multiplier bounded to `[0, 2]`.
pub fn balance_reward(base: u32, receiver_level: u32, source_level: u32, tables: &BalanceTables) -> u32 {
    let delta = (source_level as i32 - receiver_level as i32)
        .clamp(-tables.reward_level_clamp, tables.reward_level_clamp);
    let multiplier = (1.0 + delta as f32 * tables.reward_step).clamp(0.0, 2.0);
    (base as f32 * multiplier).round() as u32
}

/// Splits a total reward across group members.
///
/// Each member's slice is `ceil(total / member_count)`, independently
/// balanced against the member's own level, then boosted by
/// `(member_count − 1) × bonus` when group sharing is enabled. The ceiling
/// guarantees `sum(shares) ≥ total`.
pub fn share_reward(
    total: u32,
    member_levels: &[u32],
    source_level: u32,
    tables: &BalanceTables,
) -> Vec<u32> {
    if member_levels.is_empty() {
        return Vec::new();
    }
    let count = member_levels.len() as u32;
    let slice = total.div_ceil(count);

    member_levels
        .iter()
        .map(|&level| {
            let balanced = balance_reward(slice, level, source_level, tables);
            if tables.group_sharing_enabled && count > 1 {
                let boost = 1.0 + (count - 1) as f32 * tables.group_bonus_per_member;
                (balanced as f32 * boost).round() as u32
            } else {
                balanced
            }
        })
        .collect()
}

/// Experience needed to clear the given level: `multiplier × base^(level−1)`.
pub fn xp_required(level: u32, tables: &BalanceTables) -> u64 {
    let exponent = level.saturating_sub(1) as i32;
    (tables.xp_multiplier * tables.xp_base.powi(exponent)).round() as u64
}

/// Levels gained by one experience grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelUps {
    pub from: u32,
    pub to: u32,
}

impl LevelUps {
    pub fn gained(&self) -> u32 {
        self.to - self.from
    }
}

/// Adds experience and runs the level-up loop.
///
/// A single large grant can clear several thresholds at once. At the level
/// cap any surplus is clamped to the cap's threshold, never carried forward
/// uncapped.
pub fn grant_experience(actor: &mut ActorState, amount: u64, tables: &BalanceTables) -> LevelUps {
    let from = actor.level;
    actor.experience = actor.experience.saturating_add(amount);

    loop {
        let threshold = xp_required(actor.level, tables);
        if actor.level >= tables.max_level {
            actor.experience = actor.experience.min(threshold);
            break;
        }
        if actor.experience < threshold {
            break;
        }
        actor.experience -= threshold;
        actor.level += 1;
    }

    LevelUps {
        from,
        to: actor.level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActorId, ActorKind};
    use crate::stats::BaseProfile;

    const TABLES: BalanceTables = BalanceTables::DEFAULT;

    #[test]
    fn equal_levels_pass_reward_through() {
        assert_eq!(balance_reward(100, 20, 20, &TABLES), 100);
    }

    #[test]
    fn under_leveled_receiver_caps_at_double() {
        assert_eq!(balance_reward(100, 1, 20, &TABLES), 200);
    }

    #[test]
    fn over_leveled_receiver_bottoms_out_at_zero() {
        assert_eq!(balance_reward(100, 30, 20, &TABLES), 0);
        assert_eq!(balance_reward(100, 31, 20, &TABLES), 0);
    }

    #[test]
    fn mild_deltas_scale_linearly() {
        assert_eq!(balance_reward(100, 18, 20, &TABLES), 120);
        assert_eq!(balance_reward(100, 22, 20, &TABLES), 80);
    }

    #[test]
    fn shares_sum_never_below_total() {
        // Intentional anti-loss overshoot: ceil(5/2) = 3 per head.
        let mut tables = TABLES;
        tables.group_sharing_enabled = false;
        let shares = share_reward(5, &[10, 10], 10, &tables);
        assert_eq!(shares, vec![3, 3]);
        assert!(shares.iter().sum::<u32>() >= 5);
    }

    #[test]
    fn group_bonus_boosts_each_share() {
        let shares = share_reward(100, &[10, 10], 10, &TABLES);
        // slice 50, balanced 50, ×(1 + 1×0.1) = 55 per head.
        assert_eq!(shares, vec![55, 55]);
    }

    #[test]
    fn shares_balance_per_member_level() {
        let mut tables = TABLES;
        tables.group_sharing_enabled = false;
        let shares = share_reward(100, &[10, 30], 10, &tables);
        assert_eq!(shares, vec![50, 0]);
    }

    fn fresh_actor() -> ActorState {
        ActorState::new(ActorId(0), ActorKind::Player, BaseProfile::default())
    }

    #[test]
    fn large_grant_levels_up_multiple_times() {
        let mut actor = fresh_actor();
        // Thresholds: L1=100, L2=150, L3=225.
        let ups = grant_experience(&mut actor, 300, &TABLES);
        assert_eq!(ups.from, 1);
        assert_eq!(ups.to, 3);
        assert_eq!(actor.experience, 50);
    }

    #[test]
    fn surplus_clamped_at_level_cap() {
        let mut actor = fresh_actor();
        let mut tables = TABLES;
        tables.max_level = 2;
        grant_experience(&mut actor, 1_000_000, &tables);
        assert_eq!(actor.level, 2);
        assert_eq!(actor.experience, xp_required(2, &tables));
    }
}
