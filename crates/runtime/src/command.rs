//! Client commands and their flattening into per-tick input.
//!
//! Commands arriving over the transport are buffered into the actor's
//! [`realm_core::PendingInput`] and consumed by the next tick's event
//! evaluation, so arrival order within a tick cannot change its outcome.
//! The only exception is target selection, which gates nothing and applies
//! immediately.

use realm_core::{ActorId, ActorState, Event, PendingInput, Position, SkillRequest};

/// Untrusted input from one client, addressed to one actor.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ClientCommand {
    MoveTo(Position),
    UseSkill { slot: usize, target: Option<ActorId> },
    CancelCast,
    /// Select (or clear) the lookup-only target reference.
    SetTarget(Option<ActorId>),
    StartTrade,
    CompleteTrade,
    BeginCraft { slot: usize },
    Respawn,
}

/// Buffers one command into the actor's pending input.
///
/// Purely a flattening step: whether the input is *legal* in the actor's
/// current state is decided by the state machine at the next tick, which may
/// ignore it entirely.
pub fn buffer_command(actor: &mut ActorState, command: ClientCommand) {
    let pending: &mut PendingInput = &mut actor.pending;
    match command {
        ClientCommand::MoveTo(destination) => {
            pending.move_to = Some(destination);
            pending.events.raise(Event::MoveStarted);
        }
        ClientCommand::UseSkill { slot, target } => {
            pending.skill_request = Some(SkillRequest { slot, target });
            pending.events.raise(Event::SkillRequested);
        }
        ClientCommand::CancelCast => pending.events.raise(Event::CancelRequested),
        // Target selection is not state-machine gated: the reference is
        // validated at every use, so it applies immediately.
        ClientCommand::SetTarget(target) => actor.target = target,
        ClientCommand::StartTrade => pending.events.raise(Event::TradeStarted),
        ClientCommand::CompleteTrade => pending.events.raise(Event::TradeDone),
        ClientCommand::BeginCraft { slot } => {
            pending.skill_request = Some(SkillRequest { slot, target: None });
            pending.events.raise(Event::CraftStarted);
        }
        ClientCommand::Respawn => pending.events.raise(Event::RespawnRequested),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_core::{ActorKind, BaseProfile, EventSet};

    #[test]
    fn commands_only_touch_pending_input() {
        let mut actor = ActorState::new(ActorId(1), ActorKind::Player, BaseProfile::default());
        let before_state = actor.state;

        buffer_command(
            &mut actor,
            ClientCommand::MoveTo(Position::new(3.0, 0.0, 0.0)),
        );
        buffer_command(
            &mut actor,
            ClientCommand::UseSkill {
                slot: 0,
                target: Some(ActorId(2)),
            },
        );

        assert_eq!(actor.state, before_state);
        assert!(actor.pending.events.contains(EventSet::MOVE_STARTED));
        assert!(actor.pending.events.contains(EventSet::SKILL_REQUESTED));
        assert_eq!(actor.pending.move_to, Some(Position::new(3.0, 0.0, 0.0)));
        assert_eq!(
            actor.pending.skill_request,
            Some(SkillRequest {
                slot: 0,
                target: Some(ActorId(2)),
            })
        );
    }

    #[test]
    fn target_selection_applies_immediately() {
        let mut actor = ActorState::new(ActorId(1), ActorKind::Player, BaseProfile::default());

        buffer_command(&mut actor, ClientCommand::SetTarget(Some(ActorId(7))));
        assert_eq!(actor.target, Some(ActorId(7)));
        assert!(actor.pending.events.is_empty());

        buffer_command(&mut actor, ClientCommand::SetTarget(None));
        assert_eq!(actor.target, None);
    }
}
