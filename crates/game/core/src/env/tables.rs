//! Oracle providing balance rules and tunable numbers.
//!
//! Defines combat, reward and leveling parameters. It does NOT define entity
//! data; skill and buff descriptors come from the catalog oracle.

/// Balance parameters consumed by combat, reward and respawn logic.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BalanceTables {
    // === Combat ===
    /// Damage dealt never drops below this after defense mitigation.
    pub damage_floor: u32,
    /// Critical hits multiply dealt damage by this factor.
    pub crit_multiplier: u32,

    // === Rewards ===
    /// Base experience per victim level, before level-delta balancing.
    pub kill_xp_base: u32,
    /// Base gold per victim level, before level-delta balancing.
    pub kill_gold_base: u32,
    /// Level delta clamp for reward scaling (±levels).
    pub reward_level_clamp: i32,
    /// Multiplier change per level of delta (0.1 = ±10% per level).
    pub reward_step: f32,
    /// Extra multiplier per additional group member when sharing is on.
    pub group_bonus_per_member: f32,
    pub group_sharing_enabled: bool,

    // === Leveling ===
    /// XP threshold curve: `xp_multiplier × xp_base^(level − 1)`.
    pub xp_base: f64,
    pub xp_multiplier: f64,
    pub max_level: u32,

    // === Death & recovery ===
    /// Fraction of max health restored on respawn.
    pub respawn_health_fraction: f32,
    /// Delay between death and automatic respawn.
    pub respawn_delay_ms: u64,
    /// Out-of-combat recovery pulse interval.
    pub recovery_interval_ms: u64,
    /// Percent of max health/mana restored per recovery pulse.
    pub recovery_percent: u32,
    /// An actor must be out of combat this long before recovery pulses.
    pub disengage_after_ms: u64,
}

impl BalanceTables {
    pub const DEFAULT: Self = Self {
        damage_floor: 1,
        crit_multiplier: 2,
        kill_xp_base: 20,
        kill_gold_base: 5,
        reward_level_clamp: 20,
        reward_step: 0.1,
        group_bonus_per_member: 0.1,
        group_sharing_enabled: true,
        xp_base: 1.5,
        xp_multiplier: 100.0,
        max_level: 60,
        respawn_health_fraction: 0.5,
        respawn_delay_ms: 5_000,
        recovery_interval_ms: 3_000,
        recovery_percent: 5,
        disengage_after_ms: 8_000,
    };
}

impl Default for BalanceTables {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Oracle handing out the balance tables.
pub trait TablesOracle: Send + Sync {
    fn balance(&self) -> BalanceTables;
}

impl TablesOracle for BalanceTables {
    fn balance(&self) -> BalanceTables {
        *self
    }
}
