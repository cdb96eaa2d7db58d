/// Simulation configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Fixed tick interval of the authoritative loop, in milliseconds.
    pub tick_interval_ms: u64,
    /// Distance below which a moving actor is considered to have arrived.
    pub arrival_epsilon: f32,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum skill slots per actor (learned or not).
    pub const MAX_SKILLS: usize = 16;
    /// Maximum concurrently active buffs per actor.
    pub const MAX_BUFFS: usize = 16;
    /// Maximum inventory slots per actor.
    pub const MAX_INVENTORY_SLOTS: usize = 24;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
    pub const DEFAULT_ARRIVAL_EPSILON: f32 = 0.25;

    pub fn new() -> Self {
        Self {
            tick_interval_ms: Self::DEFAULT_TICK_INTERVAL_MS,
            arrival_epsilon: Self::DEFAULT_ARRIVAL_EPSILON,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
