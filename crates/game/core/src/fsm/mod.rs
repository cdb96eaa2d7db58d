//! Per-tick event-driven transition engine.
//!
//! Once per tick the engine evaluates a fixed, exhaustively ordered list of
//! boolean events against an actor's current state and returns exactly one
//! next-state label plus the entry action to perform. Every state handler
//! explicitly considers every event — even if the reaction is "ignore" — so
//! no event can silently fall through.
//!
//! The FSM is the *only* writer of the state label. Resolvers and reward code
//! mutate numeric fields; transitions are centralized here.

mod transition;

pub use transition::{Step, evaluate};

use bitflags::bitflags;
use strum::EnumIter;

/// Authoritative per-actor state label.
///
/// The player-controlled kind uses the full set; simpler kinds reuse the same
/// engine with a reduced reachable set (a mount never trades, a dialogue NPC
/// never casts).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FsmState {
    #[default]
    Idle,
    Moving,
    Casting,
    Stunned,
    Trading,
    Crafting,
    Dead,
}

impl FsmState {
    /// Parses a persisted or network-provided state label.
    ///
    /// An unrecognized label is the one loud error in this core: it indicates
    /// a programming or data error, not a runtime condition.
    pub fn from_label(label: &str) -> Result<Self, FsmError> {
        match label {
            "Idle" => Ok(FsmState::Idle),
            "Moving" => Ok(FsmState::Moving),
            "Casting" => Ok(FsmState::Casting),
            "Stunned" => Ok(FsmState::Stunned),
            "Trading" => Ok(FsmState::Trading),
            "Crafting" => Ok(FsmState::Crafting),
            "Dead" => Ok(FsmState::Dead),
            other => Err(FsmError::UnknownState {
                label: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum FsmError {
    #[error("unknown state label '{label}' reached the dispatcher")]
    UnknownState { label: String },
}

/// One boolean event, in evaluation priority order.
///
/// The discriminant order *is* the priority order: death first, stun second,
/// explicit cancellation third, then the rest. [`evaluate`] walks this order
/// and the first event the current state reacts to decides the transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum Event {
    Died,
    StunActive,
    CancelRequested,
    TargetDied,
    TargetDisappeared,
    SkillFinished,
    SkillRequested,
    TradeStarted,
    TradeDone,
    CraftStarted,
    CraftDone,
    MoveStarted,
    MoveEnded,
    RespawnRequested,
}

impl Event {
    fn flag(self) -> EventSet {
        match self {
            Event::Died => EventSet::DIED,
            Event::StunActive => EventSet::STUN_ACTIVE,
            Event::CancelRequested => EventSet::CANCEL_REQUESTED,
            Event::TargetDied => EventSet::TARGET_DIED,
            Event::TargetDisappeared => EventSet::TARGET_DISAPPEARED,
            Event::SkillFinished => EventSet::SKILL_FINISHED,
            Event::SkillRequested => EventSet::SKILL_REQUESTED,
            Event::TradeStarted => EventSet::TRADE_STARTED,
            Event::TradeDone => EventSet::TRADE_DONE,
            Event::CraftStarted => EventSet::CRAFT_STARTED,
            Event::CraftDone => EventSet::CRAFT_DONE,
            Event::MoveStarted => EventSet::MOVE_STARTED,
            Event::MoveEnded => EventSet::MOVE_ENDED,
            Event::RespawnRequested => EventSet::RESPAWN_REQUESTED,
        }
    }
}

bitflags! {
    /// The set of events raised for one actor in one tick.
    ///
    /// Bits are raised by the runtime from buffered client commands and from
    /// observed conditions (zero health, elapsed timers, target liveness) and
    /// consumed exactly once by [`evaluate`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct EventSet: u16 {
        const DIED               = 1 << 0;
        const STUN_ACTIVE        = 1 << 1;
        const CANCEL_REQUESTED   = 1 << 2;
        const TARGET_DIED        = 1 << 3;
        const TARGET_DISAPPEARED = 1 << 4;
        const SKILL_FINISHED     = 1 << 5;
        const SKILL_REQUESTED    = 1 << 6;
        const TRADE_STARTED      = 1 << 7;
        const TRADE_DONE         = 1 << 8;
        const CRAFT_STARTED      = 1 << 9;
        const CRAFT_DONE         = 1 << 10;
        const MOVE_STARTED       = 1 << 11;
        const MOVE_ENDED         = 1 << 12;
        const RESPAWN_REQUESTED  = 1 << 13;
    }
}

impl EventSet {
    /// True if the event's bit is raised.
    pub fn has(self, event: Event) -> bool {
        self.contains(event.flag())
    }

    pub fn raise(&mut self, event: Event) {
        self.insert(event.flag());
    }
}

/// Action to perform on entering (or re-affirming) a state.
///
/// The FSM decides *what* happens; the runtime executes it against the world
/// through the core operations (cast protocol, combat resolver, rewards).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateAction {
    /// Run death cleanup (clear buffs, target, in-flight skill) exactly once.
    EnterDead,
    /// Restore a configured health fraction, reset to the safe point.
    Respawn,
    /// Validate and begin the requested cast.
    StartCast,
    /// Re-validate and apply (or silently abort) the finished cast.
    FinishCast,
    /// Drop the in-flight cast with no cost and no cooldown.
    AbortCast,
    /// Adopt the pending movement destination.
    BeginMove,
    /// Arrived (or cancelled); clear the destination.
    StopMove,
    /// Movement is rejected in this state; forcibly reset it.
    ResetMovement,
    /// Drop the target reference (it despawned).
    ClearTarget,
    BeginTrade,
    FinishTrade,
    BeginCraft,
    FinishCraft,
    /// Abandon the in-progress craft (stun or explicit cancel).
    AbortCraft,
}
