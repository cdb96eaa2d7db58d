//! StatsSnapshot - complete derived stats at a point in time.
//!
//! Maximums and derived values are recomputed from the base curves plus the
//! *current* passive-skill and buff contributions on every call; nothing here
//! is cached, so a buff expiring mid-tick is reflected by the very next read.

use super::{BaseProfile, StatKind};
use crate::env::CatalogOracle;
use crate::state::{ActorState, GameTime};

/// Derived stats of one actor at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsSnapshot {
    pub max_health: u32,
    pub max_mana: u32,
    pub damage: u32,
    pub defense: u32,
    /// Percent, clamped to 0-100.
    pub block_chance: u32,
    /// Percent, clamped to 0-100.
    pub crit_chance: u32,
    /// Units per second.
    pub speed: f32,

    /// Current values, clamped into `[0, max]` at snapshot time.
    pub health: u32,
    pub mana: u32,
}

/// Accumulates flat bonuses per stat on top of the base curves.
#[derive(Clone, Copy, Debug, Default)]
struct BonusTotals {
    max_health: i64,
    max_mana: i64,
    damage: i64,
    defense: i64,
    block_chance: i64,
    crit_chance: i64,
    speed: f32,
}

impl BonusTotals {
    fn add(&mut self, stat: StatKind, amount: f32) {
        match stat {
            StatKind::MaxHealth => self.max_health += amount.round() as i64,
            StatKind::MaxMana => self.max_mana += amount.round() as i64,
            StatKind::Damage => self.damage += amount.round() as i64,
            StatKind::Defense => self.defense += amount.round() as i64,
            StatKind::BlockChance => self.block_chance += amount.round() as i64,
            StatKind::CritChance => self.crit_chance += amount.round() as i64,
            StatKind::Speed => self.speed += amount,
        }
    }
}

impl StatsSnapshot {
    /// Computes the full snapshot for `actor` at `now`.
    ///
    /// Contributions come from three sources, summed per stat:
    /// 1. The level-scaled base curve from the actor's [`BaseProfile`].
    /// 2. Learned passive skills (evaluated at their learned level).
    /// 3. Buffs still active at `now` (evaluated at their buff level).
    ///
    /// Catalog entries missing for a carried skill/buff id are skipped; the
    /// load boundary already reported them.
    pub fn compute(
        actor: &ActorState,
        catalog: &(impl CatalogOracle + ?Sized),
        now: GameTime,
    ) -> Self {
        let mut totals = BonusTotals::default();

        for slot in actor.skills.iter().filter(|s| s.is_learned()) {
            let Ok(descriptor) = catalog.skill(slot.id) else {
                continue;
            };
            if !descriptor.is_passive() {
                continue;
            }
            for bonus in &descriptor.passive_bonuses {
                totals.add(bonus.stat, bonus.amount.value_at(slot.level));
            }
        }

        for buff in actor.buffs.active_at(now) {
            let Ok(descriptor) = catalog.buff(buff.id) else {
                continue;
            };
            for bonus in &descriptor.bonuses {
                totals.add(bonus.stat, bonus.amount.value_at(buff.level));
            }
        }

        Self::from_totals(&actor.profile, actor.level, actor.health, actor.mana, totals)
    }

    fn from_totals(
        profile: &BaseProfile,
        level: u32,
        health: u32,
        mana: u32,
        totals: BonusTotals,
    ) -> Self {
        let clamp_u32 = |base: u32, bonus: i64| -> u32 {
            (base as i64 + bonus).clamp(0, u32::MAX as i64) as u32
        };

        let max_health = clamp_u32(profile.max_health.rounded_at(level), totals.max_health).max(1);
        let max_mana = clamp_u32(profile.max_mana.rounded_at(level), totals.max_mana);

        Self {
            max_health,
            max_mana,
            damage: clamp_u32(profile.damage.rounded_at(level), totals.damage),
            defense: clamp_u32(profile.defense.rounded_at(level), totals.defense),
            block_chance: (profile.block_chance.rounded_at(level) as i64 + totals.block_chance)
                .clamp(0, 100) as u32,
            crit_chance: (profile.crit_chance.rounded_at(level) as i64 + totals.crit_chance)
                .clamp(0, 100) as u32,
            speed: (profile.speed.value_at(level) + totals.speed).max(0.0),
            health: health.min(max_health),
            mana: mana.min(max_mana),
        }
    }

    /// Health bar ratio in `[0, 1]`.
    pub fn health_fraction(&self) -> f32 {
        self.health as f32 / self.max_health as f32
    }

    /// Mana bar ratio in `[0, 1]`; a manaless actor reads as full.
    pub fn mana_fraction(&self) -> f32 {
        if self.max_mana == 0 {
            return 1.0;
        }
        self.mana as f32 / self.max_mana as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{ActorTemplate, BuffDescriptor, CatalogError, CatalogOracle};
    use crate::skill::{SkillDescriptor, SkillId};
    use crate::state::{ActorId, ActorKind, Buff, BuffId};
    use crate::stats::{BonusCurve, ScalingCurve};

    struct TestCatalog {
        buffs: Vec<BuffDescriptor>,
    }

    impl CatalogOracle for TestCatalog {
        fn skill(&self, id: SkillId) -> Result<&SkillDescriptor, CatalogError> {
            Err(CatalogError::MissingSkill(id.0))
        }

        fn buff(&self, id: BuffId) -> Result<&BuffDescriptor, CatalogError> {
            self.buffs
                .iter()
                .find(|b| b.id() == id)
                .ok_or(CatalogError::MissingBuff(id.0))
        }

        fn template(&self, name: &str) -> Result<&ActorTemplate, CatalogError> {
            Err(CatalogError::MissingTemplate(name.to_string()))
        }
    }

    fn actor() -> ActorState {
        let profile = BaseProfile {
            max_health: ScalingCurve::new(100.0, 10.0),
            max_mana: ScalingCurve::new(50.0, 5.0),
            damage: ScalingCurve::new(10.0, 1.0),
            defense: ScalingCurve::flat(2.0),
            block_chance: ScalingCurve::flat(10.0),
            crit_chance: ScalingCurve::flat(5.0),
            speed: ScalingCurve::flat(4.0),
        };
        ActorState::new(ActorId(1), ActorKind::Player, profile)
    }

    fn catalog_with_vigor() -> TestCatalog {
        TestCatalog {
            buffs: vec![BuffDescriptor {
                name: "vigor".into(),
                bonuses: vec![BonusCurve::new(
                    StatKind::MaxHealth,
                    ScalingCurve::new(20.0, 10.0),
                )],
            }],
        }
    }

    #[test]
    fn base_curve_scales_with_level() {
        let catalog = TestCatalog { buffs: Vec::new() };
        let mut a = actor();
        a.level = 5;
        let snap = StatsSnapshot::compute(&a, &catalog, GameTime::ZERO);
        assert_eq!(snap.max_health, 140);
        assert_eq!(snap.damage, 14);
    }

    #[test]
    fn active_buff_raises_max_until_expiry() {
        let catalog = catalog_with_vigor();
        let mut a = actor();
        a.buffs.add_or_refresh(Buff {
            id: BuffId::from_name("vigor"),
            level: 2,
            expires_at: GameTime::new(1_000),
        });

        let before = StatsSnapshot::compute(&a, &catalog, GameTime::new(500));
        assert_eq!(before.max_health, 130); // 100 + (20 + 10×1)

        // Expired (remaining exactly zero): invisible without any sweep.
        let after = StatsSnapshot::compute(&a, &catalog, GameTime::new(1_000));
        assert_eq!(after.max_health, 100);
    }

    #[test]
    fn current_clamped_to_recomputed_max() {
        let catalog = catalog_with_vigor();
        let mut a = actor();
        a.buffs.add_or_refresh(Buff {
            id: BuffId::from_name("vigor"),
            level: 1,
            expires_at: GameTime::new(1_000),
        });
        a.health = 120; // legal while the buff holds

        let during = StatsSnapshot::compute(&a, &catalog, GameTime::new(0));
        assert_eq!(during.health, 120);

        let after = StatsSnapshot::compute(&a, &catalog, GameTime::new(1_000));
        assert_eq!(after.health, 100);
        assert_eq!(after.health_fraction(), 1.0);
    }

    #[test]
    fn missing_catalog_buff_is_skipped() {
        let catalog = TestCatalog { buffs: Vec::new() };
        let mut a = actor();
        a.buffs.add_or_refresh(Buff {
            id: BuffId::from_name("removed_content"),
            level: 1,
            expires_at: GameTime::new(1_000),
        });
        let snap = StatsSnapshot::compute(&a, &catalog, GameTime::ZERO);
        assert_eq!(snap.max_health, 100);
    }
}
