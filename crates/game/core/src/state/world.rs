//! Owned actor registry, threaded through the simulation tick.
//!
//! The world replaces ambient global actor maps: it is constructed at server
//! start, passed by reference into every operation, and is the only owner of
//! actor state. Cross-actor mutation (attacker/defender) uses an explicit
//! split borrow so the two references provably never alias.

use super::actor::ActorState;
use super::common::ActorId;

/// Arena of live actors plus the deterministic RNG stream state.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldState {
    actors: Vec<Option<ActorState>>,
    /// Base seed for the deterministic RNG stream.
    pub seed: u64,
    /// Monotonic counter mixed into every roll's seed.
    pub nonce: u64,
}

impl WorldState {
    pub fn new(seed: u64) -> Self {
        Self {
            actors: Vec::new(),
            seed,
            nonce: 0,
        }
    }

    /// Inserts an actor, reusing a free slot when available. The actor's id
    /// is assigned here and also returned.
    pub fn spawn(&mut self, mut actor: ActorState) -> ActorId {
        if let Some(index) = self.actors.iter().position(Option::is_none) {
            let id = ActorId(index as u32);
            actor.id = id;
            self.actors[index] = Some(actor);
            return id;
        }
        let id = ActorId(self.actors.len() as u32);
        actor.id = id;
        self.actors.push(Some(actor));
        id
    }

    /// Removes an actor, returning its final state.
    pub fn despawn(&mut self, id: ActorId) -> Option<ActorState> {
        self.actors.get_mut(id.0 as usize)?.take()
    }

    pub fn actor(&self, id: ActorId) -> Option<&ActorState> {
        self.actors.get(id.0 as usize)?.as_ref()
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut ActorState> {
        self.actors.get_mut(id.0 as usize)?.as_mut()
    }

    /// Mutable access to two distinct actors at once.
    ///
    /// Returns `None` if either id is missing or the ids are equal.
    pub fn pair_mut(
        &mut self,
        a: ActorId,
        b: ActorId,
    ) -> Option<(&mut ActorState, &mut ActorState)> {
        let (ai, bi) = (a.0 as usize, b.0 as usize);
        if ai == bi || ai >= self.actors.len() || bi >= self.actors.len() {
            return None;
        }
        let (first, second) = if ai < bi { (ai, bi) } else { (bi, ai) };
        let (left, right) = self.actors.split_at_mut(second);
        let first_actor = left[first].as_mut()?;
        let second_actor = right[0].as_mut()?;
        if ai < bi {
            Some((first_actor, second_actor))
        } else {
            Some((second_actor, first_actor))
        }
    }

    /// Ids of all live actors, in slot order (the tick's evaluation order).
    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.actors
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| ActorId(i as u32)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.actors.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Next value of the roll nonce; callers mix it into their RNG seed.
    pub fn next_nonce(&mut self) -> u64 {
        let nonce = self.nonce;
        self.nonce += 1;
        nonce
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ActorKind;
    use crate::stats::BaseProfile;

    fn spawn_two(world: &mut WorldState) -> (ActorId, ActorId) {
        let a = world.spawn(ActorState::new(
            ActorId(0),
            ActorKind::Player,
            BaseProfile::default(),
        ));
        let b = world.spawn(ActorState::new(
            ActorId(0),
            ActorKind::Hostile,
            BaseProfile::default(),
        ));
        (a, b)
    }

    #[test]
    fn spawn_reuses_free_slots() {
        let mut world = WorldState::new(7);
        let (a, b) = spawn_two(&mut world);
        world.despawn(a);
        let c = world.spawn(ActorState::new(
            ActorId(0),
            ActorKind::Companion,
            BaseProfile::default(),
        ));
        assert_eq!(c, a);
        assert_eq!(world.len(), 2);
        assert!(world.actor(b).is_some());
    }

    #[test]
    fn pair_mut_rejects_aliasing() {
        let mut world = WorldState::new(7);
        let (a, b) = spawn_two(&mut world);
        assert!(world.pair_mut(a, a).is_none());
        let (left, right) = world.pair_mut(b, a).unwrap();
        assert_eq!(left.id, b);
        assert_eq!(right.id, a);
    }
}
