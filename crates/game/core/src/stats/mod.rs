//! Resource model: level-scaled base curves plus bonus aggregation.
//!
//! Every derived stat is a three-way sum: a level-scaled base curve, the
//! contributions of learned passive skills, and the contributions of active
//! buffs. Maximums are never cached; [`StatsSnapshot::compute`] re-derives
//! them on every read so an expired buff is reflected immediately.

mod snapshot;

pub use snapshot::StatsSnapshot;

/// Linear level-scaled curve: `base + per_level × (level − 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalingCurve {
    pub base: f32,
    pub per_level: f32,
}

impl ScalingCurve {
    pub const fn new(base: f32, per_level: f32) -> Self {
        Self { base, per_level }
    }

    pub const fn flat(base: f32) -> Self {
        Self {
            base,
            per_level: 0.0,
        }
    }

    /// Curve value at a given level. Level 0 (unlearned) evaluates as level 1.
    pub fn value_at(&self, level: u32) -> f32 {
        let level = level.max(1);
        self.base + self.per_level * (level - 1) as f32
    }

    /// Curve value rounded to the nearest whole unit, floored at zero.
    pub fn rounded_at(&self, level: u32) -> u32 {
        self.value_at(level).round().max(0.0) as u32
    }
}

/// Individual derived stat a bonus can apply to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatKind {
    MaxHealth,
    MaxMana,
    Damage,
    Defense,
    /// Percent chance to fully block incoming damage, 0-100.
    BlockChance,
    /// Percent chance to double outgoing damage, 0-100.
    CritChance,
    /// Movement speed in units per second.
    Speed,
}

/// Level-scaled flat bonus to one stat, contributed by a passive skill level
/// or a buff level.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BonusCurve {
    pub stat: StatKind,
    pub amount: ScalingCurve,
}

impl BonusCurve {
    pub const fn new(stat: StatKind, amount: ScalingCurve) -> Self {
        Self { stat, amount }
    }
}

/// Per-actor base stat curves, copied from the actor template at spawn.
///
/// Keeping the curves on the actor avoids a catalog round-trip on every stat
/// read while preserving the rule that maximums are recomputed, not stored.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseProfile {
    pub max_health: ScalingCurve,
    pub max_mana: ScalingCurve,
    pub damage: ScalingCurve,
    pub defense: ScalingCurve,
    pub block_chance: ScalingCurve,
    pub crit_chance: ScalingCurve,
    pub speed: ScalingCurve,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_scales_linearly_from_level_one() {
        let curve = ScalingCurve::new(100.0, 10.0);
        assert_eq!(curve.rounded_at(1), 100);
        assert_eq!(curve.rounded_at(5), 140);
        // Level 0 (unlearned) behaves like level 1.
        assert_eq!(curve.rounded_at(0), 100);
    }
}
