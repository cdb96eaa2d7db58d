use std::fmt;

/// Unique identifier for any simulated actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Absolute server-clock time in milliseconds.
///
/// All deadlines (cast end, cooldown end, stun expiry, buff expiry) are stored
/// as absolute `GameTime` and compared against the current tick's time. At the
/// persistence boundary they are converted to *remaining* durations, because
/// absolute values are meaningless after a restart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameTime(pub u64);

impl GameTime {
    pub const ZERO: Self = Self(0);

    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds remaining until this deadline, zero if already passed.
    pub fn remaining_from(self, now: GameTime) -> u64 {
        self.0.saturating_sub(now.0)
    }

    /// True once the deadline has been reached.
    pub fn elapsed_at(self, now: GameTime) -> bool {
        now.0 >= self.0
    }
}

impl std::ops::Add<u64> for GameTime {
    type Output = GameTime;
    fn add(self, millis: u64) -> GameTime {
        GameTime(self.0 + millis)
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// World-space position in server units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Step toward `dest` by at most `max_step`, returning the new position
    /// and whether the destination was reached.
    pub fn step_toward(&self, dest: &Position, max_step: f32) -> (Position, bool) {
        let dist = self.distance(dest);
        if dist <= max_step {
            return (*dest, true);
        }
        let t = max_step / dist;
        (
            Position::new(
                self.x + (dest.x - self.x) * t,
                self.y + (dest.y - self.y) * t,
                self.z + (dest.z - self.z) * t,
            ),
            false,
        )
    }
}

/// Stable 64-bit identifier derived from a catalog name (FNV-1a).
///
/// Catalog identity is by hash of name, not by reference, so skill and buff
/// references stay plain-old-data across the wire and across restarts.
pub const fn stable_id(name: &str) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let bytes = name.as_bytes();
    let mut hash = OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(PRIME);
        i += 1;
    }
    hash
}
