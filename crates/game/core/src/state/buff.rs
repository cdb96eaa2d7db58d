//! Timed stat modifiers, stacked by identifier.
//!
//! One active instance per identifier: re-applying a buff refreshes the
//! existing entry in place instead of duplicating it. Expired entries are
//! removed by a once-per-tick sweep; aggregate queries additionally filter by
//! expiry so a buff that lapses mid-tick never leaks into the next stat read.

use arrayvec::ArrayVec;

use super::common::{GameTime, stable_id};
use crate::config::GameConfig;

/// Stable identifier of a buff catalog entry (hash of name).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffId(pub u64);

impl BuffId {
    pub const fn from_name(name: &str) -> Self {
        Self(stable_id(name))
    }
}

/// A single active buff instance.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Buff {
    pub id: BuffId,
    pub level: u32,
    pub expires_at: GameTime,
}

/// Active buffs on an actor, bounded and swept per tick.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffSet {
    buffs: ArrayVec<Buff, { GameConfig::MAX_BUFFS }>,
}

impl BuffSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds a buff, or refreshes the existing instance with the same id.
    ///
    /// Refresh replaces level and expiry in place; the set never holds two
    /// instances of the same identifier. A full set drops the new buff.
    pub fn add_or_refresh(&mut self, buff: Buff) {
        if let Some(existing) = self.buffs.iter_mut().find(|b| b.id == buff.id) {
            *existing = buff;
            return;
        }
        if !self.buffs.is_full() {
            self.buffs.push(buff);
        }
    }

    /// Removes every buff whose remaining duration is zero at `now`.
    pub fn remove_expired(&mut self, now: GameTime) {
        self.buffs.retain(|b| !b.expires_at.elapsed_at(now));
    }

    /// Removes all buffs immediately (death cleanup).
    pub fn clear(&mut self) {
        self.buffs.clear();
    }

    /// Iterates buffs still active at `now`.
    pub fn active_at(&self, now: GameTime) -> impl Iterator<Item = &Buff> + '_ {
        self.buffs.iter().filter(move |b| !b.expires_at.elapsed_at(now))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Buff> {
        self.buffs.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buff(name: &str, level: u32, expires_at: u64) -> Buff {
        Buff {
            id: BuffId::from_name(name),
            level,
            expires_at: GameTime::new(expires_at),
        }
    }

    #[test]
    fn refresh_replaces_in_place() {
        let mut set = BuffSet::empty();
        set.add_or_refresh(buff("haste", 1, 1_000));
        set.add_or_refresh(buff("haste", 3, 5_000));
        assert_eq!(set.len(), 1);
        let only = set.iter().next().unwrap();
        assert_eq!(only.level, 3);
        assert_eq!(only.expires_at, GameTime::new(5_000));
    }

    #[test]
    fn sweep_removes_exactly_expired() {
        let mut set = BuffSet::empty();
        set.add_or_refresh(buff("haste", 1, 1_000));
        set.add_or_refresh(buff("shield", 1, 2_000));
        // Remaining duration of exactly zero counts as expired.
        set.remove_expired(GameTime::new(1_000));
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().id, BuffId::from_name("shield"));
    }

    #[test]
    fn expired_buff_invisible_to_aggregates_before_sweep() {
        let mut set = BuffSet::empty();
        set.add_or_refresh(buff("haste", 1, 1_000));
        assert_eq!(set.active_at(GameTime::new(999)).count(), 1);
        assert_eq!(set.active_at(GameTime::new(1_000)).count(), 0);
    }
}
