//! Fighter: one actor with its state machine, body and up to three actions.
//!
//! Split in two so actions can borrow the body while the fighter keeps the
//! action array:
//! - [`FighterCore`]: everything an action may touch (states, body, health, volumes)
//! - [`Fighter`]: the core + action slots + input edge detection
//!
//! Every public operation that may change the current state ends with
//! `settle`: recorded interruptions are delivered to the owning actions and a
//! `StateChanged` event is emitted if the visible state moved.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::actions::{ActionContext, ActionKind, FighterAction, HitEffect, HitTarget};
use crate::config::{FighterConfig, StaggerConfig};
use crate::error::CombatError;
use crate::fighter::motion::{limit_angle, Body};
use crate::fighter::{Health, HitVolume, HitVolumeController, HitVolumeId};
use crate::projectile::ProjectileId;
use crate::simulation::{CombatEvent, SimContext, TimerCallback};
use crate::state::{InterruptionSource, StateController, STATE_STAGGER};
use crate::timer::TimerId;

/// Action slots per fighter
pub const ACTION_MAX: usize = 3;

/// Angles below this are "already facing"
const TURN_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FighterId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum StaggerLevel {
    Light,
    Heavy,
    /// Also knocks the fighter away from the blow origin
    Blown,
}

#[derive(Debug)]
pub struct FighterCore {
    pub id: FighterId,
    pub nickname: String,
    pub health: Health,
    pub states: StateController,
    pub body: Body,
    pub hit_volumes: HitVolumeController,
    pub target: Option<FighterId>,
    stagger: StaggerConfig,
    stagger_timer: Option<TimerId>,
}

impl FighterCore {
    fn new(id: FighterId, config: &FighterConfig) -> Self {
        Self {
            id,
            nickname: config.nickname.clone(),
            health: Health::new(config.hp),
            states: StateController::new(config.motion),
            body: Body::default(),
            hit_volumes: HitVolumeController::default(),
            target: None,
            stagger: config.stagger,
            stagger_timer: None,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    pub fn forward(&self) -> Vec3 {
        self.body.forward()
    }

    pub fn stagger_config(&self) -> &StaggerConfig {
        &self.stagger
    }

    pub fn stagger_timer(&self) -> Option<TimerId> {
        self.stagger_timer
    }

    /// Move forward at `rate` × current running speed. Gated by `running`.
    pub fn run(&mut self, rate: f32, delta: f32) -> bool {
        if !self.states.movement().running {
            return false;
        }

        let speed = self.states.motion_parameters_current().running_speed;
        self.body.position += self.body.forward() * speed * rate * delta;
        self.body.ran_this_tick = true;
        true
    }

    /// Turn toward the absolute heading `degrees`, limited by the current
    /// turning speed. Returns the signed angle actually turned.
    pub fn turn(&mut self, degrees: f32, delta: f32) -> f32 {
        if !self.states.movement().turning {
            return 0.0;
        }

        let to_turn = limit_angle(limit_angle(degrees) - self.body.heading);
        if to_turn.abs() < TURN_EPSILON {
            return 0.0;
        }

        let max_step = self.states.motion_parameters_current().turning_speed * delta;
        let step = to_turn.abs().min(max_step) * to_turn.signum();
        self.body.heading = limit_angle(self.body.heading + step);
        step
    }

    /// Turn, then run scaled by how well we now face `degrees` (no running
    /// backwards while still turning around).
    pub fn turn_and_run(&mut self, rate: f32, degrees: f32, delta: f32) -> f32 {
        let turned = self.turn(degrees, delta);
        let remaining = limit_angle(limit_angle(degrees) - self.body.heading);
        let alignment = remaining.to_radians().cos().max(0.0);
        self.run(rate * alignment, delta);
        turned
    }

    /// Add a velocity change away from `origin` (horizontal, normalized) plus
    /// a fixed upward component.
    pub fn knock_back(&mut self, origin: Vec3, horizontal: f32, vertical: f32, events: &mut Vec<CombatEvent>) {
        let mut away = self.body.position - origin;
        away.y = 0.0;
        let impulse = away.normalize_or_zero() * horizontal + Vec3::Y * vertical;

        self.body.impulse += impulse;
        events.push(CombatEvent::KnockedBack {
            fighter: self.id,
            impulse,
        });
    }

    pub fn take_damage(&mut self, amount: u32, events: &mut Vec<CombatEvent>) {
        self.health.take_damage(amount);
        crate::log(&format!(
            "💥 {} takes {} damage ({}/{})",
            self.nickname, amount, self.health.current, self.health.max
        ));
        events.push(CombatEvent::DamageTaken {
            fighter: self.id,
            amount,
            hp_left: self.health.current,
        });
        if !self.health.is_alive() {
            crate::log_info(&format!("💀 {} is down", self.nickname));
        }
    }

    pub fn set_gravity(&mut self, enabled: bool, events: &mut Vec<CombatEvent>) {
        if self.body.gravity == enabled {
            return;
        }
        self.body.gravity = enabled;
        events.push(CombatEvent::GravityToggled {
            fighter: self.id,
            enabled,
        });
    }
}

#[derive(Debug)]
pub struct Fighter {
    core: FighterCore,
    actions: [Option<Box<dyn FighterAction>>; ACTION_MAX],
    invoking_now: [bool; ACTION_MAX],
    invoked_before: [bool; ACTION_MAX],
    /// Last state name published as `StateChanged`
    reported_state: String,
}

impl Fighter {
    /// Build a fighter with the actions listed in `config`.
    pub fn new(id: FighterId, config: &FighterConfig) -> Result<Self, CombatError> {
        config.validate()?;
        Self::with_actions(id, config, config.build_actions())
    }

    /// Build a fighter with explicit action objects (slot = index).
    ///
    /// Fails on more than [`ACTION_MAX`] actions or on clashing state names.
    pub fn with_actions(
        id: FighterId,
        config: &FighterConfig,
        actions: Vec<Box<dyn FighterAction>>,
    ) -> Result<Self, CombatError> {
        if actions.len() > ACTION_MAX {
            return Err(CombatError::TooManyActions {
                max: ACTION_MAX,
                got: actions.len(),
            });
        }

        let mut core = FighterCore::new(id, config);
        let mut slots: [Option<Box<dyn FighterAction>>; ACTION_MAX] = std::array::from_fn(|_| None);

        for (slot, mut action) in actions.into_iter().enumerate() {
            for state in action.states() {
                let mut state = state.clone();
                state.action_number = Some(slot);
                let name = state.name.clone();
                if !core.states.register_state(state) {
                    return Err(CombatError::DuplicateState(name));
                }
            }
            slots[slot] = Some(action);
        }

        let reported_state = core.states.current_name().to_string();
        Ok(Self {
            core,
            actions: slots,
            invoking_now: [false; ACTION_MAX],
            invoked_before: [false; ACTION_MAX],
            reported_state,
        })
    }

    pub fn id(&self) -> FighterId {
        self.core.id
    }

    pub fn nickname(&self) -> &str {
        &self.core.nickname
    }

    pub fn core(&self) -> &FighterCore {
        &self.core
    }

    pub fn states(&self) -> &StateController {
        &self.core.states
    }

    pub fn state_name(&self) -> &str {
        self.core.states.current_name()
    }

    pub fn body(&self) -> &Body {
        &self.core.body
    }

    pub fn position(&self) -> Vec3 {
        self.core.body.position
    }

    pub fn heading(&self) -> f32 {
        self.core.body.heading
    }

    pub fn health(&self) -> Health {
        self.core.health
    }

    pub fn hp_ratio(&self) -> f32 {
        self.core.health.ratio()
    }

    pub fn is_alive(&self) -> bool {
        self.core.health.is_alive()
    }

    pub fn target(&self) -> Option<FighterId> {
        self.core.target
    }

    pub fn set_target(&mut self, target: Option<FighterId>) {
        self.core.target = target;
    }

    /// Place the fighter (spawn, teleport, physics write-back).
    pub fn place(&mut self, position: Vec3, heading: f32) {
        self.core.body.position = position;
        self.core.body.heading = limit_angle(heading);
    }

    /// Velocity change accumulated since the last call (knockback).
    pub fn take_impulse(&mut self) -> Vec3 {
        self.core.body.take_impulse()
    }

    pub fn hit_volume(&self, id: HitVolumeId) -> Option<&HitVolume> {
        self.core.hit_volumes.get(id)
    }

    pub fn action(&self, slot: usize) -> Option<&dyn FighterAction> {
        self.actions.get(slot)?.as_deref()
    }

    pub fn slot_of(&self, kind: ActionKind) -> Option<usize> {
        self.actions
            .iter()
            .position(|action| action.as_ref().is_some_and(|a| a.kind() == kind))
    }

    pub fn is_invoking(&self, slot: usize) -> bool {
        self.invoking_now.get(slot).copied().unwrap_or(false)
    }

    /// Register input for this tick. Edges are resolved by the next `tick`.
    ///
    /// Refused when the slot is empty, or when the current state forbids
    /// actions and does not belong to this very slot.
    pub fn invoke_action(&mut self, slot: usize) -> bool {
        if self.action(slot).is_none() {
            return false;
        }

        let current = self.core.states.current();
        if !current.movement.action && current.action_number != Some(slot) {
            return false;
        }

        self.invoking_now[slot] = true;
        true
    }

    pub fn invoke_action_kind(&mut self, kind: ActionKind) -> bool {
        match self.slot_of(kind) {
            Some(slot) => self.invoke_action(slot),
            None => false,
        }
    }

    /// Start an action directly, bypassing input edges. Refused if the
    /// current state already belongs to `slot`.
    pub fn start_action(&mut self, slot: usize, sim: &mut SimContext<'_>) -> bool {
        if self.core.states.current().action_number == Some(slot) {
            return false;
        }
        self.with_action(slot, sim, |action, ctx| action.start(ctx)).is_some()
    }

    pub fn start_action_kind(&mut self, kind: ActionKind, sim: &mut SimContext<'_>) -> bool {
        match self.slot_of(kind) {
            Some(slot) => self.start_action(slot, sim),
            None => false,
        }
    }

    /// One simulation step: resolve input edges, then update every action.
    pub fn tick(&mut self, sim: &mut SimContext<'_>, delta: f32) {
        self.activate_actions(sim);
        for slot in 0..ACTION_MAX {
            self.with_action(slot, sim, |action, ctx| action.update(ctx, delta));
        }
    }

    /// Clear per-tick flags. Called after timers have been dispatched.
    pub fn end_tick(&mut self) {
        self.core.body.ran_this_tick = false;
    }

    pub fn run(&mut self, rate: f32, delta: f32) -> bool {
        self.core.run(rate, delta)
    }

    pub fn turn(&mut self, degrees: f32, delta: f32) -> f32 {
        self.core.turn(degrees, delta)
    }

    pub fn turn_and_run(&mut self, rate: f32, degrees: f32, delta: f32) -> f32 {
        self.core.turn_and_run(rate, degrees, delta)
    }

    pub fn knock_back(&mut self, origin: Vec3, horizontal: f32, vertical: f32, sim: &mut SimContext<'_>) {
        self.core.knock_back(origin, horizontal, vertical, sim.events);
    }

    pub fn take_damage(&mut self, amount: u32, sim: &mut SimContext<'_>) {
        self.core.take_damage(amount, sim.events);
    }

    /// Request a state from outside the action system (scripted sequences,
    /// tests). Interruptions are delivered before returning.
    pub fn request_state(&mut self, name: &str, source: InterruptionSource, sim: &mut SimContext<'_>) -> bool {
        let granted = self.core.states.request_state_with(name, source);
        self.settle(sim);
        granted
    }

    pub fn end_state(&mut self, name: &str, sim: &mut SimContext<'_>) -> bool {
        let ended = self.core.states.end_state(name);
        self.settle(sim);
        ended
    }

    /// Enter stagger for the duration of `level`.
    ///
    /// `reset_timer` re-arms the running stagger timer instead of starting a
    /// new one; a fighter already staggering always re-arms, and a stagger
    /// left on the stack is merged into the new one. `Blown` also
    /// knocks the fighter away from `origin` (straight up without one).
    pub fn stagger(
        &mut self,
        level: StaggerLevel,
        reset_timer: bool,
        origin: Option<Vec3>,
        sim: &mut SimContext<'_>,
    ) -> bool {
        let already_staggering = self.core.states.is_current(STATE_STAGGER);
        let stacked = !already_staggering
            && self
                .core
                .states
                .preempted()
                .iter()
                .any(|state| state.name == STATE_STAGGER);
        if !self.core.states.request_state(STATE_STAGGER) {
            return false;
        }
        // Один stagger на бойца: старая запись в стеке сливается с новой
        if stacked {
            self.core.states.drop_preempted(STATE_STAGGER);
        }

        let duration = self.core.stagger.duration(level);
        let callback = TimerCallback::StaggerRecovery {
            fighter: self.core.id,
        };
        if !(reset_timer || already_staggering || stacked) {
            if let Some(stale) = self.core.stagger_timer.take() {
                sim.timers.unregister(stale);
            }
        }
        sim.timers
            .rearm_or_start(&mut self.core.stagger_timer, duration, callback);

        crate::log(&format!(
            "😵 {} staggered ({:?}, {:.1}s)",
            self.core.nickname, level, duration
        ));
        sim.emit(CombatEvent::Staggered {
            fighter: self.core.id,
            level,
        });

        if level == StaggerLevel::Blown {
            let origin = origin.unwrap_or(self.core.body.position);
            let horizontal = self.core.stagger.blown_horizontal;
            let vertical = self.core.stagger.blown_vertical;
            self.core.knock_back(origin, horizontal, vertical, sim.events);
        }

        self.settle(sim);
        true
    }

    /// Route a fired timer to its owner inside this fighter.
    pub fn on_timer(&mut self, id: TimerId, callback: TimerCallback, sim: &mut SimContext<'_>) {
        match callback {
            TimerCallback::Action { slot, .. } => {
                if self
                    .with_action(slot, sim, |action, ctx| action.on_timer(ctx, id))
                    .is_none()
                {
                    sim.timers.unregister(id);
                }
            }
            TimerCallback::StaggerRecovery { .. } => self.recover_from_stagger(id, sim),
        }
    }

    /// Our volume in `slot` touched `target`. Returns what to apply to it.
    pub fn hit(&mut self, slot: usize, target: &HitTarget, sim: &mut SimContext<'_>) -> Option<HitEffect> {
        self.with_action(slot, sim, |action, ctx| action.on_hit(ctx, target))
            .flatten()
    }

    pub fn on_projectile_gone(&mut self, slot: usize, projectile: ProjectileId, sim: &mut SimContext<'_>) {
        self.with_action(slot, sim, |action, ctx| action.on_projectile_gone(ctx, projectile));
    }

    /// Broadcast an animation event to every equipped action.
    pub fn on_animation_event(&mut self, event: &str, sim: &mut SimContext<'_>) {
        for slot in 0..ACTION_MAX {
            self.with_action(slot, sim, |action, ctx| action.on_animation_event(ctx, event));
        }
    }

    fn recover_from_stagger(&mut self, id: TimerId, sim: &mut SimContext<'_>) {
        sim.timers.unregister(id);
        if self.core.stagger_timer == Some(id) {
            self.core.stagger_timer = None;
        }

        if self.core.states.end_state(STATE_STAGGER) {
            crate::log(&format!("{} recovered", self.core.nickname));
            sim.emit(CombatEvent::StaggerRecovered {
                fighter: self.core.id,
            });
        }
        self.settle(sim);
    }

    fn activate_actions(&mut self, sim: &mut SimContext<'_>) {
        for slot in 0..ACTION_MAX {
            let now = self.invoking_now[slot];
            let before = self.invoked_before[slot];

            match (before, now) {
                (false, true) => {
                    self.start_action(slot, sim);
                }
                (true, true) => {
                    self.with_action(slot, sim, |action, ctx| action.continue_action(ctx));
                }
                (true, false) => {
                    self.with_action(slot, sim, |action, ctx| action.end(ctx));
                }
                (false, false) => {}
            }

            self.invoked_before[slot] = now;
            self.invoking_now[slot] = false;
        }
    }

    /// Call into the action in `slot`, then settle.
    fn with_action<R>(
        &mut self,
        slot: usize,
        sim: &mut SimContext<'_>,
        f: impl FnOnce(&mut dyn FighterAction, &mut ActionContext<'_>) -> R,
    ) -> Option<R> {
        let result = self.call_action(slot, sim, f);
        if result.is_some() {
            self.settle(sim);
        }
        result
    }

    fn call_action<R>(
        &mut self,
        slot: usize,
        sim: &mut SimContext<'_>,
        f: impl FnOnce(&mut dyn FighterAction, &mut ActionContext<'_>) -> R,
    ) -> Option<R> {
        let action = self.actions.get_mut(slot)?.as_mut()?;
        let mut ctx = ActionContext::new(slot, &mut self.core, sim);
        Some(f(action.as_mut(), &mut ctx))
    }

    fn settle(&mut self, sim: &mut SimContext<'_>) {
        loop {
            let interruptions = self.core.states.drain_interruptions();
            if interruptions.is_empty() {
                break;
            }

            for interruption in interruptions {
                let Some(slot) = interruption.action_number else {
                    continue;
                };
                self.call_action(slot, sim, |action, ctx| {
                    action.on_interrupted(ctx, interruption.source)
                });
            }
        }

        let current = self.core.states.current_name();
        if current != self.reported_state {
            let to = current.to_string();
            let from = std::mem::replace(&mut self.reported_state, to.clone());
            sim.emit(CombatEvent::StateChanged {
                fighter: self.core.id,
                from,
                to,
            });
        }
    }
}
