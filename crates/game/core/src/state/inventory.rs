//! Item slots and gold. The item catalog itself is an external collaborator;
//! the core only stores opaque identifiers and counts.

use arrayvec::ArrayVec;

use super::common::stable_id;
use crate::config::GameConfig;

/// Stable identifier of an item catalog entry (hash of name).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u64);

impl ItemId {
    pub const fn from_name(name: &str) -> Self {
        Self(stable_id(name))
    }
}

/// One stack of a single item kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemSlot {
    pub item: ItemId,
    pub count: u32,
}

/// Bounded per-actor item storage.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inventory {
    slots: ArrayVec<ItemSlot, { GameConfig::MAX_INVENTORY_SLOTS }>,
}

impl Inventory {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds items, stacking onto an existing slot when possible.
    ///
    /// Returns false if the inventory is full and no stack exists.
    pub fn add(&mut self, item: ItemId, count: u32) -> bool {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.item == item) {
            slot.count += count;
            return true;
        }
        if self.slots.is_full() {
            return false;
        }
        self.slots.push(ItemSlot { item, count });
        true
    }

    /// Removes items; returns false (and removes nothing) if short.
    pub fn remove(&mut self, item: ItemId, count: u32) -> bool {
        let Some(index) = self.slots.iter().position(|s| s.item == item) else {
            return false;
        };
        if self.slots[index].count < count {
            return false;
        }
        self.slots[index].count -= count;
        if self.slots[index].count == 0 {
            self.slots.remove(index);
        }
        true
    }

    pub fn count_of(&self, item: ItemId) -> u32 {
        self.slots
            .iter()
            .find(|s| s.item == item)
            .map_or(0, |s| s.count)
    }

    pub fn slots(&self) -> &[ItemSlot] {
        &self.slots
    }
}
