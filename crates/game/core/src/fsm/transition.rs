//! State × event reaction table.
//!
//! Each state has one handler with an exhaustive `match` over every event, so
//! adding an event fails to compile until every state has decided how to react
//! to it. `None` is an explicit "ignore".

use strum::IntoEnumIterator;

use super::{Event, EventSet, FsmState, StateAction};

/// Result of one tick's evaluation: the next state and its entry action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub next: FsmState,
    pub action: Option<StateAction>,
}

impl Step {
    fn to(next: FsmState) -> Self {
        Self { next, action: None }
    }

    fn with(next: FsmState, action: StateAction) -> Self {
        Self {
            next,
            action: Some(action),
        }
    }

    fn stay(state: FsmState, action: StateAction) -> Self {
        Self::with(state, action)
    }
}

/// Evaluates the ordered event list against the current state.
///
/// Events are visited in [`Event`] declaration order; the first one the state
/// reacts to decides the transition. With no reacting event the state holds —
/// except `Stunned`, which recovers to `Idle` once the stun-active condition
/// is no longer observed.
pub fn evaluate(state: FsmState, events: EventSet) -> Step {
    for event in Event::iter() {
        if !events.has(event) {
            continue;
        }
        if let Some(step) = react(state, event) {
            return step;
        }
    }

    // Stun recovery: the runtime stops raising StunActive once the expiry
    // timestamp has passed.
    if state == FsmState::Stunned && !events.has(Event::StunActive) {
        return Step::to(FsmState::Idle);
    }

    Step::to(state)
}

fn react(state: FsmState, event: Event) -> Option<Step> {
    // Death always wins and is terminal until an explicit respawn.
    if event == Event::Died {
        return match state {
            FsmState::Dead => None,
            _ => Some(Step::with(FsmState::Dead, StateAction::EnterDead)),
        };
    }

    match state {
        FsmState::Idle => idle(event),
        FsmState::Moving => moving(event),
        FsmState::Casting => casting(event),
        FsmState::Stunned => stunned(event),
        FsmState::Trading => trading(event),
        FsmState::Crafting => crafting(event),
        FsmState::Dead => dead(event),
    }
}

fn idle(event: Event) -> Option<Step> {
    match event {
        Event::Died => unreachable!("handled in react"),
        Event::StunActive => Some(Step::to(FsmState::Stunned)),
        Event::CancelRequested => None,
        Event::TargetDied => Some(Step::stay(FsmState::Idle, StateAction::ClearTarget)),
        Event::TargetDisappeared => Some(Step::stay(FsmState::Idle, StateAction::ClearTarget)),
        Event::SkillFinished => None,
        Event::SkillRequested => Some(Step::with(FsmState::Casting, StateAction::StartCast)),
        Event::TradeStarted => Some(Step::with(FsmState::Trading, StateAction::BeginTrade)),
        Event::TradeDone => None,
        Event::CraftStarted => Some(Step::with(FsmState::Crafting, StateAction::BeginCraft)),
        Event::CraftDone => None,
        Event::MoveStarted => Some(Step::with(FsmState::Moving, StateAction::BeginMove)),
        Event::MoveEnded => None,
        Event::RespawnRequested => None,
    }
}

fn moving(event: Event) -> Option<Step> {
    match event {
        Event::Died => unreachable!("handled in react"),
        // Stun cancels pending movement.
        Event::StunActive => Some(Step::with(FsmState::Stunned, StateAction::StopMove)),
        Event::CancelRequested => Some(Step::with(FsmState::Idle, StateAction::StopMove)),
        Event::TargetDied => Some(Step::stay(FsmState::Moving, StateAction::ClearTarget)),
        Event::TargetDisappeared => Some(Step::stay(FsmState::Moving, StateAction::ClearTarget)),
        Event::SkillFinished => None,
        // Casting may start while sliding toward the pre-commit destination.
        Event::SkillRequested => Some(Step::with(FsmState::Casting, StateAction::StartCast)),
        Event::TradeStarted => Some(Step::with(FsmState::Trading, StateAction::BeginTrade)),
        Event::TradeDone => None,
        Event::CraftStarted => Some(Step::with(FsmState::Crafting, StateAction::BeginCraft)),
        Event::CraftDone => None,
        // New destination while already moving.
        Event::MoveStarted => Some(Step::stay(FsmState::Moving, StateAction::BeginMove)),
        Event::MoveEnded => Some(Step::with(FsmState::Idle, StateAction::StopMove)),
        Event::RespawnRequested => None,
    }
}

fn casting(event: Event) -> Option<Step> {
    match event {
        Event::Died => unreachable!("handled in react"),
        // Stun preempts everything except death and cancels the cast.
        Event::StunActive => Some(Step::with(FsmState::Stunned, StateAction::AbortCast)),
        Event::CancelRequested => Some(Step::with(FsmState::Idle, StateAction::AbortCast)),
        // Raised only for skills flagged cancel_on_target_died.
        Event::TargetDied => Some(Step::with(FsmState::Idle, StateAction::AbortCast)),
        Event::TargetDisappeared => Some(Step::with(FsmState::Idle, StateAction::AbortCast)),
        // Clears the in-flight skill before anything else can read it.
        Event::SkillFinished => Some(Step::with(FsmState::Idle, StateAction::FinishCast)),
        // Already committed; a new request cannot interrupt.
        Event::SkillRequested => None,
        Event::TradeStarted => None,
        Event::TradeDone => None,
        Event::CraftStarted => None,
        Event::CraftDone => None,
        // Commitment is irrevocable: movement never cancels an in-progress
        // cast; the actor keeps sliding to its pre-commit destination.
        Event::MoveStarted => None,
        Event::MoveEnded => None,
        Event::RespawnRequested => None,
    }
}

fn stunned(event: Event) -> Option<Step> {
    match event {
        Event::Died => unreachable!("handled in react"),
        // Recovery is handled in evaluate() once StunActive stops being raised.
        Event::StunActive => None,
        Event::CancelRequested => None,
        Event::TargetDied => Some(Step::stay(FsmState::Stunned, StateAction::ClearTarget)),
        Event::TargetDisappeared => Some(Step::stay(FsmState::Stunned, StateAction::ClearTarget)),
        Event::SkillFinished => None,
        Event::SkillRequested => None,
        Event::TradeStarted => None,
        Event::TradeDone => None,
        Event::CraftStarted => None,
        Event::CraftDone => None,
        Event::MoveStarted => None,
        Event::MoveEnded => None,
        Event::RespawnRequested => None,
    }
}

fn trading(event: Event) -> Option<Step> {
    match event {
        Event::Died => unreachable!("handled in react"),
        Event::StunActive => Some(Step::to(FsmState::Stunned)),
        Event::CancelRequested => Some(Step::to(FsmState::Idle)),
        Event::TargetDied => Some(Step::stay(FsmState::Trading, StateAction::ClearTarget)),
        Event::TargetDisappeared => Some(Step::stay(FsmState::Trading, StateAction::ClearTarget)),
        Event::SkillFinished => None,
        Event::SkillRequested => None,
        Event::TradeStarted => None,
        Event::TradeDone => Some(Step::with(FsmState::Idle, StateAction::FinishTrade)),
        Event::CraftStarted => None,
        Event::CraftDone => None,
        // Trading is mutually exclusive with locomotion.
        Event::MoveStarted => Some(Step::stay(FsmState::Trading, StateAction::ResetMovement)),
        Event::MoveEnded => None,
        Event::RespawnRequested => None,
    }
}

fn crafting(event: Event) -> Option<Step> {
    match event {
        Event::Died => unreachable!("handled in react"),
        Event::StunActive => Some(Step::with(FsmState::Stunned, StateAction::AbortCraft)),
        Event::CancelRequested => Some(Step::with(FsmState::Idle, StateAction::AbortCraft)),
        Event::TargetDied => Some(Step::stay(FsmState::Crafting, StateAction::ClearTarget)),
        Event::TargetDisappeared => Some(Step::stay(FsmState::Crafting, StateAction::ClearTarget)),
        Event::SkillFinished => None,
        Event::SkillRequested => None,
        Event::TradeStarted => None,
        Event::TradeDone => None,
        Event::CraftStarted => None,
        Event::CraftDone => Some(Step::with(FsmState::Idle, StateAction::FinishCraft)),
        // Crafting is mutually exclusive with locomotion.
        Event::MoveStarted => Some(Step::stay(FsmState::Crafting, StateAction::ResetMovement)),
        Event::MoveEnded => None,
        Event::RespawnRequested => None,
    }
}

fn dead(event: Event) -> Option<Step> {
    match event {
        Event::Died => unreachable!("handled in react"),
        Event::StunActive => None,
        Event::CancelRequested => None,
        Event::TargetDied => None,
        Event::TargetDisappeared => None,
        Event::SkillFinished => None,
        Event::SkillRequested => None,
        Event::TradeStarted => None,
        Event::TradeDone => None,
        Event::CraftStarted => None,
        Event::CraftDone => None,
        Event::MoveStarted => None,
        Event::MoveEnded => None,
        Event::RespawnRequested => Some(Step::with(FsmState::Idle, StateAction::Respawn)),
    }
}
