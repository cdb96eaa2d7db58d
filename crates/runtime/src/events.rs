//! Topic-based event bus for observers of the simulation.
//!
//! Events are best-effort notifications for clients, logging and tooling; the
//! authoritative record is the world state itself. Consumers subscribe to the
//! topic they care about and lag behind at their own risk (broadcast channels
//! drop the oldest events on overflow).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use realm_core::{ActorId, DamageReport, FsmState, GameTime, ItemId, SkillId};

/// Topics for event routing.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// State label changes, deaths, respawns.
    Lifecycle,
    /// Cast protocol and damage resolution.
    Combat,
    /// Experience, levels, crafting output.
    Progression,
}

/// One observable simulation occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SimEvent {
    StateChanged {
        actor: ActorId,
        from: FsmState,
        to: FsmState,
    },
    ActorDied {
        actor: ActorId,
        killer: Option<ActorId>,
    },
    Respawned {
        actor: ActorId,
    },
    CastStarted {
        actor: ActorId,
        skill: SkillId,
        target: Option<ActorId>,
        cast_end: GameTime,
    },
    CastFinished {
        actor: ActorId,
        skill: SkillId,
        target: Option<ActorId>,
    },
    /// A committed cast that fell apart before applying; `reason` is
    /// human-readable, for logs and client toasts.
    CastAborted {
        actor: ActorId,
        skill: SkillId,
        reason: String,
    },
    DamageDealt {
        attacker: ActorId,
        defender: ActorId,
        report: DamageReport,
    },
    LeveledUp {
        actor: ActorId,
        from: u32,
        to: u32,
    },
    CraftCompleted {
        actor: ActorId,
        item: ItemId,
    },
}

impl SimEvent {
    pub fn topic(&self) -> Topic {
        match self {
            SimEvent::StateChanged { .. }
            | SimEvent::ActorDied { .. }
            | SimEvent::Respawned { .. } => Topic::Lifecycle,
            SimEvent::CastStarted { .. }
            | SimEvent::CastFinished { .. }
            | SimEvent::CastAborted { .. }
            | SimEvent::DamageDealt { .. } => Topic::Combat,
            SimEvent::LeveledUp { .. } | SimEvent::CraftCompleted { .. } => Topic::Progression,
        }
    }
}

/// Topic-based event bus.
///
/// One broadcast channel per topic, created up front; publishing to a topic
/// nobody subscribed to is normal and silently dropped.
#[derive(Clone)]
pub struct EventBus {
    lifecycle: broadcast::Sender<SimEvent>,
    combat: broadcast::Sender<SimEvent>,
    progression: broadcast::Sender<SimEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lifecycle: broadcast::channel(capacity).0,
            combat: broadcast::channel(capacity).0,
            progression: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<SimEvent> {
        match topic {
            Topic::Lifecycle => &self.lifecycle,
            Topic::Combat => &self.combat,
            Topic::Progression => &self.progression,
        }
    }

    /// Publish an event to its topic.
    pub fn publish(&self, event: SimEvent) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            tracing::trace!(?topic, "no subscribers for topic");
        }
    }

    /// Subscribe to one topic; only that topic's events arrive.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<SimEvent> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_route_to_their_topic_only() {
        let bus = EventBus::new();
        let mut lifecycle = bus.subscribe(Topic::Lifecycle);
        let mut combat = bus.subscribe(Topic::Combat);

        bus.publish(SimEvent::Respawned { actor: ActorId(1) });

        assert!(matches!(
            lifecycle.try_recv(),
            Ok(SimEvent::Respawned { .. })
        ));
        assert!(combat.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(SimEvent::LeveledUp {
            actor: ActorId(1),
            from: 1,
            to: 2,
        });
    }
}
