//! Deterministic RNG for combat rolls.
//!
//! Every roll (block, critical, stun) draws from a stateless PCG stream
//! seeded from `(world seed, roll nonce, actor id, context)`. Given the same
//! inputs the same outcomes fall out, which keeps the authoritative side
//! replayable in tests and across restarts.

/// Oracle for deterministic random number generation.
///
/// Implementations must produce the same value for the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform roll in `[0, 100)`; succeeds when below `chance_percent`.
    ///
    /// A chance of 100 always succeeds, a chance of 0 never does.
    fn roll_chance(&self, seed: u64, chance_percent: u32) -> bool {
        (self.next_u32(seed) % 100) < chance_percent
    }
}

/// PCG-XSH-RR random number generator.
///
/// Single multiply + xorshift + rotate over 64-bit state; deterministic,
/// branch-free and statistically solid for game rolls.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Roll contexts, so one damage resolution can draw several independent
/// values from the same nonce.
pub mod roll {
    pub const BLOCK: u32 = 0;
    pub const CRIT: u32 = 1;
    pub const STUN: u32 = 2;
}

/// Mixes world seed, roll nonce, actor id and roll context into one seed.
pub fn compute_seed(world_seed: u64, nonce: u64, actor_id: u32, context: u32) -> u64 {
    // SplitMix64 / FxHash style combiners.
    let mut hash = world_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor_id as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// Test double: a rigged oracle returning a fixed percentile.
///
/// `FixedRoll(0)` makes every chance roll succeed; `FixedRoll(99)` makes
/// every roll below 100 fail.
#[derive(Clone, Copy, Debug)]
pub struct FixedRoll(pub u32);

impl RngOracle for FixedRoll {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcg_is_deterministic() {
        let rng = PcgRng;
        assert_eq!(rng.next_u32(42), rng.next_u32(42));
        assert_ne!(rng.next_u32(42), rng.next_u32(43));
    }

    #[test]
    fn chance_bounds() {
        let rng = PcgRng;
        for seed in 0..64 {
            assert!(rng.roll_chance(seed, 100));
            assert!(!rng.roll_chance(seed, 0));
        }
    }

    #[test]
    fn seeds_differ_by_context() {
        let a = compute_seed(1, 2, 3, roll::BLOCK);
        let b = compute_seed(1, 2, 3, roll::CRIT);
        assert_ne!(a, b);
    }
}
