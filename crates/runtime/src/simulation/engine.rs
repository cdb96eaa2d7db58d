//! The fixed-interval tick engine owning the authoritative world.
//!
//! Each tick runs four phases in a fixed order:
//!
//! 1. **Integrate movement** for moving actors and for casters still
//!    sliding toward a destination committed before the cast.
//! 2. **Upkeep**: sweep expired buffs, clamp resources, fire due scheduled
//!    events (respawns, recovery pulses) and craft/cast deadlines.
//! 3. **Stage events**: observe conditions (zero health, stun windows, target
//!    liveness, elapsed timers) and merge them with buffered client input
//!    into one event set per actor.
//! 4. **Transition**: evaluate the state machine per actor and execute the
//!    resulting entry actions against the world.
//!
//! The engine is single-threaded by construction; all cross-actor mutation
//! happens inside one phase-4 call stack via explicit split borrows.

use tracing::{debug, warn};

use realm_content::StaticCatalog;
use realm_core::{
    ActorId, ActorState, CastOutcome, CatalogOracle, CraftJob, Env, Event, EventSet, FsmState,
    GameConfig, GameTime, PcgRng, ScheduledKind, SkillEffect, StateAction, StatsSnapshot,
    TablesOracle, WorldState, balance_reward, evaluate, finish_cast, grant_experience, start_cast,
};

use crate::events::{EventBus, SimEvent};

/// Authoritative simulation state plus the tick clock.
pub struct TickEngine {
    world: WorldState,
    clock: GameTime,
    config: GameConfig,
    /// Lethal hits observed this tick and last, keyed by victim. Consumed
    /// when the victim's death transition runs.
    kills: Vec<(ActorId, ActorId)>,
}

impl TickEngine {
    pub fn new(world: WorldState, config: GameConfig) -> Self {
        Self {
            world,
            clock: GameTime::ZERO,
            config,
            kills: Vec::new(),
        }
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    pub fn clock(&self) -> GameTime {
        self.clock
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Spawns an actor and schedules its first recovery pulse.
    pub fn spawn(&mut self, actor: ActorState, catalog: &StaticCatalog) -> ActorId {
        let interval = catalog.balance().recovery_interval_ms;
        let id = self.world.spawn(actor);
        if let Some(actor) = self.world.actor_mut(id) {
            actor.schedule(self.clock + interval, ScheduledKind::RecoveryPulse);
        }
        id
    }

    /// Advances the clock one tick and runs all four phases.
    pub fn step(&mut self, catalog: &StaticCatalog, bus: &EventBus) {
        self.clock = self.clock + self.config.tick_interval_ms;
        let now = self.clock;

        self.integrate_movement(catalog, now);
        self.upkeep(catalog, now);
        let staged = self.stage_events(now);
        for (id, events) in staged {
            self.transition(id, events, catalog, bus, now);
        }
    }

    // ========================================================================
    // Phase 1: movement
    // ========================================================================

    fn integrate_movement(&mut self, catalog: &StaticCatalog, now: GameTime) {
        for id in self.world.actor_ids() {
            let Some(actor) = self.world.actor(id) else {
                continue;
            };
            // Moving actors walk; casting actors keep sliding toward the
            // destination they committed to before the cast.
            if actor.state != FsmState::Moving && actor.state != FsmState::Casting {
                continue;
            }
            let state = actor.state;
            let Some(destination) = actor.destination else {
                continue;
            };
            let speed = StatsSnapshot::compute(actor, catalog, now).speed;
            let step = speed * self.config.tick_interval_ms as f32 / 1_000.0;

            let Some(actor) = self.world.actor_mut(id) else {
                continue;
            };
            let (next, arrived) = actor.position.step_toward(&destination, step.max(0.0));
            actor.position = next;
            if arrived || next.distance(&destination) <= self.config.arrival_epsilon {
                match state {
                    FsmState::Moving => actor.pending.events.raise(Event::MoveEnded),
                    // No transition to drive from Casting: just stop sliding.
                    _ => actor.destination = None,
                }
            }
        }
    }

    // ========================================================================
    // Phase 2: upkeep
    // ========================================================================

    fn upkeep(&mut self, catalog: &StaticCatalog, now: GameTime) {
        let tables = catalog.balance();
        for id in self.world.actor_ids() {
            let Some(actor) = self.world.actor(id) else {
                continue;
            };
            let stats = StatsSnapshot::compute(actor, catalog, now);

            let Some(actor) = self.world.actor_mut(id) else {
                continue;
            };
            actor.buffs.remove_expired(now);
            actor.clamp_resources(stats.max_health, stats.max_mana);

            for due in actor.take_due(now) {
                match due.kind {
                    ScheduledKind::Respawn => actor.pending.events.raise(Event::RespawnRequested),
                    ScheduledKind::RecoveryPulse => {
                        if actor.is_alive() {
                            let disengaged = now.0.saturating_sub(actor.last_combat.0)
                                >= tables.disengage_after_ms;
                            if disengaged {
                                actor.heal(
                                    stats.max_health * tables.recovery_percent / 100,
                                    stats.max_health,
                                );
                                actor.restore_mana(
                                    stats.max_mana * tables.recovery_percent / 100,
                                    stats.max_mana,
                                );
                            }
                            actor.schedule(
                                now + tables.recovery_interval_ms,
                                ScheduledKind::RecoveryPulse,
                            );
                        }
                    }
                }
            }
        }
    }

    // ========================================================================
    // Phase 3: event staging
    // ========================================================================

    fn stage_events(&self, now: GameTime) -> Vec<(ActorId, EventSet)> {
        self.world
            .actor_ids()
            .into_iter()
            .filter_map(|id| {
                let actor = self.world.actor(id)?;
                let mut events = actor.pending.events;

                if !actor.is_alive() && actor.state != FsmState::Dead {
                    events.raise(Event::Died);
                }
                if actor.is_stunned(now) {
                    events.raise(Event::StunActive);
                }

                match actor.state {
                    FsmState::Casting => match actor.cast {
                        Some(cast) => {
                            if cast.cast_end.elapsed_at(now) {
                                events.raise(Event::SkillFinished);
                            }
                            if cast.cancel_on_target_died
                                && let Some(target) = cast.target
                                && target != id
                            {
                                match self.world.actor(target) {
                                    None => events.raise(Event::TargetDisappeared),
                                    Some(t) if !t.is_alive() => events.raise(Event::TargetDied),
                                    Some(_) => {}
                                }
                            }
                        }
                        // A casting label with no in-flight cast (restored
                        // state, or a rejected start): fall back to idle.
                        None => events.raise(Event::CancelRequested),
                    },
                    FsmState::Crafting => match actor.craft {
                        Some(job) => {
                            if job.finish_at.elapsed_at(now) {
                                events.raise(Event::CraftDone);
                            }
                        }
                        None => events.raise(Event::CancelRequested),
                    },
                    _ => {
                        if let Some(target) = actor.target {
                            match self.world.actor(target) {
                                None => events.raise(Event::TargetDisappeared),
                                Some(t) if !t.is_alive() => events.raise(Event::TargetDied),
                                Some(_) => {}
                            }
                        }
                    }
                }

                Some((id, events))
            })
            .collect()
    }

    // ========================================================================
    // Phase 4: transitions
    // ========================================================================

    fn transition(
        &mut self,
        id: ActorId,
        events: EventSet,
        catalog: &StaticCatalog,
        bus: &EventBus,
        now: GameTime,
    ) {
        let Some(actor) = self.world.actor(id) else {
            return;
        };
        let prev = actor.state;
        let step = evaluate(prev, events);

        let next = match step.action {
            Some(action) => self.execute(action, id, prev, step.next, catalog, bus, now),
            None => step.next,
        };

        if let Some(actor) = self.world.actor_mut(id) {
            actor.pending.clear();
            actor.state = next;
        }
        if next != prev {
            bus.publish(SimEvent::StateChanged {
                actor: id,
                from: prev,
                to: next,
            });
        }
    }

    /// Executes one entry action and returns the state actually entered.
    ///
    /// Start-type actions validate against the world; a rejected start keeps
    /// the previous state, making an illegal client request a no-op.
    fn execute(
        &mut self,
        action: StateAction,
        id: ActorId,
        prev: FsmState,
        next: FsmState,
        catalog: &StaticCatalog,
        bus: &EventBus,
        now: GameTime,
    ) -> FsmState {
        match action {
            StateAction::EnterDead => {
                self.enter_dead(id, catalog, bus, now);
                next
            }
            StateAction::Respawn => {
                self.respawn(id, catalog, bus, now);
                next
            }
            StateAction::StartCast => {
                let request = self
                    .world
                    .actor_mut(id)
                    .and_then(|a| a.pending.skill_request.take());
                let Some(request) = request else {
                    return prev;
                };
                let tables = catalog.balance();
                let env = Env::new(catalog, &tables, &PcgRng).as_game_env();
                match start_cast(&mut self.world, id, request.slot, request.target, now, &env) {
                    Ok(started) => {
                        bus.publish(SimEvent::CastStarted {
                            actor: id,
                            skill: started.skill,
                            target: started.target,
                            cast_end: started.cast_end,
                        });
                        next
                    }
                    Err(err) => {
                        debug!(actor = %id, %err, "cast request rejected");
                        prev
                    }
                }
            }
            StateAction::FinishCast => {
                let tables = catalog.balance();
                let env = Env::new(catalog, &tables, &PcgRng).as_game_env();
                match finish_cast(&mut self.world, id, now, &env) {
                    Ok(CastOutcome::Applied {
                        skill,
                        target,
                        damage,
                    }) => {
                        bus.publish(SimEvent::CastFinished {
                            actor: id,
                            skill,
                            target,
                        });
                        if let (Some(report), Some(defender)) = (damage, target) {
                            bus.publish(SimEvent::DamageDealt {
                                attacker: id,
                                defender,
                                report,
                            });
                            if report.lethal {
                                self.kills.push((defender, id));
                            }
                        }
                    }
                    Ok(CastOutcome::Aborted { skill, reason }) => {
                        bus.publish(SimEvent::CastAborted {
                            actor: id,
                            skill,
                            reason: reason.to_string(),
                        });
                    }
                    Err(err) => warn!(actor = %id, %err, "finish without a valid cast"),
                }
                // Any unfinished pre-commit slide ends with the cast.
                if let Some(actor) = self.world.actor_mut(id) {
                    actor.destination = None;
                }
                next
            }
            StateAction::AbortCast => {
                if let Some(actor) = self.world.actor_mut(id) {
                    actor.destination = None;
                    if let Some(cast) = actor.cast.take() {
                        // Free the slot's cast timer so the skill can be
                        // retried.
                        let skill = actor.skill_slot(cast.slot).map(|slot| slot.id);
                        if let Some(slot) = actor.skill_slot_mut(cast.slot) {
                            slot.cast_end = now;
                        }
                        if let Some(skill) = skill {
                            bus.publish(SimEvent::CastAborted {
                                actor: id,
                                skill,
                                reason: "interrupted".to_string(),
                            });
                        }
                    }
                }
                next
            }
            StateAction::BeginMove => {
                if let Some(actor) = self.world.actor_mut(id)
                    && let Some(destination) = actor.pending.move_to.take()
                {
                    actor.destination = Some(destination);
                }
                next
            }
            StateAction::StopMove => {
                if let Some(actor) = self.world.actor_mut(id) {
                    actor.destination = None;
                }
                next
            }
            StateAction::ResetMovement => {
                if let Some(actor) = self.world.actor_mut(id) {
                    actor.destination = None;
                    actor.pending.move_to = None;
                }
                next
            }
            StateAction::ClearTarget => {
                if let Some(actor) = self.world.actor_mut(id) {
                    actor.target = None;
                }
                next
            }
            // The trade ledger itself lives outside the simulation; the
            // state machine only guards what a trading actor may do.
            StateAction::BeginTrade | StateAction::FinishTrade => next,
            StateAction::BeginCraft => self.begin_craft(id, prev, next, catalog, now),
            StateAction::FinishCraft => {
                if let Some(actor) = self.world.actor_mut(id)
                    && let Some(job) = actor.craft.take()
                {
                    if !actor.inventory.add(job.output, 1) {
                        warn!(actor = %id, "inventory full, craft output dropped");
                    }
                    actor.skill_experience += job.skill_xp;
                    bus.publish(SimEvent::CraftCompleted {
                        actor: id,
                        item: job.output,
                    });
                }
                next
            }
            StateAction::AbortCraft => {
                if let Some(actor) = self.world.actor_mut(id) {
                    actor.craft = None;
                }
                next
            }
        }
    }

    /// Death transition: attribute the kill, pay the killer, clean up, and
    /// schedule the automatic respawn.
    fn enter_dead(&mut self, id: ActorId, catalog: &StaticCatalog, bus: &EventBus, now: GameTime) {
        let tables = catalog.balance();

        let killer = match self.kills.iter().position(|(victim, _)| *victim == id) {
            Some(index) => Some(self.kills.swap_remove(index).1),
            // Aggro source as fallback attribution (e.g. death by a damage
            // path that predates the kill ledger entry).
            None => self.world.actor(id).and_then(|a| a.target),
        };

        let victim_level = self.world.actor(id).map_or(1, |a| a.level);

        if let Some(killer_id) = killer
            && killer_id != id
            && let Some(killer_actor) = self.world.actor_mut(killer_id)
        {
            let xp = balance_reward(
                tables.kill_xp_base * victim_level,
                killer_actor.level,
                victim_level,
                &tables,
            );
            let gold = balance_reward(
                tables.kill_gold_base * victim_level,
                killer_actor.level,
                victim_level,
                &tables,
            );
            killer_actor.gold += gold as u64;
            let ups = grant_experience(killer_actor, xp as u64, &tables);
            if ups.gained() > 0 {
                bus.publish(SimEvent::LeveledUp {
                    actor: killer_id,
                    from: ups.from,
                    to: ups.to,
                });
            }
        }

        if let Some(actor) = self.world.actor_mut(id) {
            actor.death_cleanup();
            actor.schedule(now + tables.respawn_delay_ms, ScheduledKind::Respawn);
        }
        bus.publish(SimEvent::ActorDied { actor: id, killer });
    }

    fn respawn(&mut self, id: ActorId, catalog: &StaticCatalog, bus: &EventBus, now: GameTime) {
        let tables = catalog.balance();
        let Some(actor) = self.world.actor(id) else {
            return;
        };
        let stats = StatsSnapshot::compute(actor, catalog, now);

        if let Some(actor) = self.world.actor_mut(id) {
            actor.respawn(
                stats.max_health,
                stats.max_mana,
                tables.respawn_health_fraction,
            );
            actor.schedule(now + tables.recovery_interval_ms, ScheduledKind::RecoveryPulse);
        }
        bus.publish(SimEvent::Respawned { actor: id });
    }

    /// Starts a craft job from the buffered request. The skill's cast time
    /// doubles as the craft duration and its mana cost is paid up front.
    fn begin_craft(
        &mut self,
        id: ActorId,
        prev: FsmState,
        next: FsmState,
        catalog: &StaticCatalog,
        now: GameTime,
    ) -> FsmState {
        let request = self
            .world
            .actor_mut(id)
            .and_then(|a| a.pending.skill_request.take());
        let Some(request) = request else {
            return prev;
        };
        let Some(actor) = self.world.actor(id) else {
            return prev;
        };
        let Some(slot) = actor.skill_slot(request.slot).copied() else {
            debug!(actor = %id, slot = request.slot, "craft request for missing slot");
            return prev;
        };
        let descriptor = match catalog.skill(slot.id) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                warn!(actor = %id, %err, "craft request for unknown skill");
                return prev;
            }
        };
        let SkillEffect::Craft { output, skill_xp } = descriptor.effect.clone() else {
            debug!(actor = %id, "craft request for a non-craft skill");
            return prev;
        };
        if !slot.is_learned() || !slot.timers_ready(now) {
            return prev;
        }
        let duration = descriptor.cast_time_at(slot.level);
        let mana_cost = descriptor.mana_cost_at(slot.level);

        let Some(actor) = self.world.actor_mut(id) else {
            return prev;
        };
        if !actor.spend_mana(mana_cost) {
            debug!(actor = %id, "craft request without the mana for it");
            return prev;
        }
        actor.craft = Some(CraftJob {
            output,
            skill_xp,
            finish_at: now + duration,
        });
        next
    }
}
