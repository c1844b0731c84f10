//! Fighter actions (moves) and their lifecycle protocol.
//!
//! # Lifecycle
//!
//! The fighter samples one "invoking" flag per slot each tick and turns it
//! into edges:
//!
//! ```text
//! !before &&  now → start           (may be refused: request_state denied)
//!  before &&  now → continue_action (held input, e.g. extend a dash)
//!  before && !now → end             (released input)
//! ```
//!
//! Independently of input an action may finish itself (timer, projectile gone,
//! animation end). Finishing is idempotent: an action can be told to stop
//! from a timer and from an interruption in the same tick.
//!
//! An action never owns its fighter: every callback gets an
//! [`ActionContext`] lending the fighter body and the session services.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::fighter::{BodyPart, FighterCore, FighterId, HitVolumeId, StaggerLevel};
use crate::projectile::{ProjectileId, ProjectileLaunch, Projectiles};
use crate::simulation::{CombatEvent, SimContext, SimTimers, TimerCallback};
use crate::state::{InterruptionSource, State};
use crate::timer::TimerId;

pub mod iron_tail;
pub mod tackle;
pub mod thunderbolt;


pub use iron_tail::{IronTail, IronTailProperty};
pub use tackle::{Tackle, TackleProperty};
pub use thunderbolt::{Thunderbolt, ThunderboltProperty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum ActionKind {
    Tackle,
    IronTail,
    Thunderbolt,
}

/// Fighter hit by one of our volumes, as seen at contact time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTarget {
    pub id: FighterId,
    pub position: Vec3,
}

/// What a landed hit does to the target. Applied by the simulation to the
/// target's own state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEffect {
    pub damage: u32,
    pub stagger: Option<StaggerLevel>,
    pub reset_stagger_timer: bool,
    /// Blow origin for `StaggerLevel::Blown`
    pub origin: Option<Vec3>,
}

pub trait FighterAction: std::fmt::Debug + Send + Sync {
    fn kind(&self) -> ActionKind;

    fn is_working(&self) -> bool;

    /// States this action drives. Built on first call; later calls return
    /// the same set. The fighter registers them at construction.
    fn states(&mut self) -> &[State];

    fn start(&mut self, ctx: &mut ActionContext<'_>);

    fn continue_action(&mut self, _ctx: &mut ActionContext<'_>) {}

    fn end(&mut self, _ctx: &mut ActionContext<'_>) {}

    /// Every tick, after edge handling.
    fn update(&mut self, _ctx: &mut ActionContext<'_>, _delta: f32) {}

    fn on_timer(&mut self, _ctx: &mut ActionContext<'_>, _timer: TimerId) {}

    /// One of our hit volumes touched another fighter.
    fn on_hit(&mut self, _ctx: &mut ActionContext<'_>, _target: &HitTarget) -> Option<HitEffect> {
        None
    }

    /// One of our states was pushed onto the preemption stack. Only called
    /// for states built with `notifying_interruption`.
    fn on_interrupted(&mut self, _ctx: &mut ActionContext<'_>, _source: InterruptionSource) {}

    /// A projectile we launched hit something or ran out of range.
    fn on_projectile_gone(&mut self, _ctx: &mut ActionContext<'_>, _projectile: ProjectileId) {}

    /// Named event reported by the presentation layer's animation.
    fn on_animation_event(&mut self, _ctx: &mut ActionContext<'_>, _event: &str) {}
}

/// Borrowed view handed to action callbacks.
pub struct ActionContext<'a> {
    pub slot: usize,
    pub fighter: &'a mut FighterCore,
    pub timers: &'a mut SimTimers,
    pub projectiles: &'a mut Projectiles,
    pub events: &'a mut Vec<CombatEvent>,
}

impl<'a> ActionContext<'a> {
    pub fn new(slot: usize, fighter: &'a mut FighterCore, sim: &'a mut SimContext<'_>) -> Self {
        Self {
            slot,
            fighter,
            timers: &mut *sim.timers,
            projectiles: &mut *sim.projectiles,
            events: &mut *sim.events,
        }
    }

    pub fn fighter_id(&self) -> FighterId {
        self.fighter.id
    }

    /// Timer callback routed back to this action.
    pub fn callback(&self) -> TimerCallback {
        TimerCallback::Action {
            fighter: self.fighter.id,
            slot: self.slot,
        }
    }

    pub fn start_timer(&mut self, duration: f32) -> TimerId {
        let callback = self.callback();
        self.timers.start(duration, callback)
    }

    pub fn rearm_timer(&mut self, slot: &mut Option<TimerId>, duration: f32) -> TimerId {
        let callback = self.callback();
        self.timers.rearm_or_start(slot, duration, callback)
    }

    /// Unregister and forget the timer in `slot`.
    pub fn cancel_timer(&mut self, slot: &mut Option<TimerId>) {
        if let Some(id) = slot.take() {
            self.timers.unregister(id);
        }
    }

    pub fn request_state(&mut self, name: &str) -> bool {
        self.fighter.states.request_state(name)
    }

    pub fn end_state(&mut self, name: &str) -> bool {
        self.fighter.states.end_state(name)
    }

    pub fn emit(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    pub fn action_started(&mut self, kind: ActionKind) {
        crate::log(&format!(
            "⚔️ {} starts {:?} (slot {})",
            self.fighter.nickname, kind, self.slot
        ));
        let event = CombatEvent::ActionStarted {
            fighter: self.fighter.id,
            slot: self.slot,
            kind,
        };
        self.emit(event);
    }

    pub fn action_finished(&mut self, kind: ActionKind) {
        crate::log(&format!(
            "{} finished {:?} (slot {})",
            self.fighter.nickname, kind, self.slot
        ));
        let event = CombatEvent::ActionFinished {
            fighter: self.fighter.id,
            slot: self.slot,
            kind,
        };
        self.emit(event);
    }

    pub fn spawn_hit_volume(&mut self, part: BodyPart) -> HitVolumeId {
        let volume = self.fighter.hit_volumes.generate(self.slot, part);
        let event = CombatEvent::HitVolumeSpawned {
            fighter: self.fighter.id,
            volume,
            part,
        };
        self.emit(event);
        volume
    }

    /// Delete and forget the volume in `slot`.
    pub fn remove_hit_volume(&mut self, slot: &mut Option<HitVolumeId>) {
        let Some(volume) = slot.take() else {
            return;
        };
        if self.fighter.hit_volumes.delete(volume) {
            let event = CombatEvent::HitVolumeRemoved {
                fighter: self.fighter.id,
                volume,
            };
            self.emit(event);
        }
    }

    pub fn set_gravity(&mut self, enabled: bool) {
        self.fighter.set_gravity(enabled, self.events);
    }

    pub fn knock_back(&mut self, origin: Vec3, horizontal: f32, vertical: f32) {
        self.fighter.knock_back(origin, horizontal, vertical, self.events);
    }

    pub fn trigger_animation(&mut self, trigger: &str) {
        let event = CombatEvent::AnimationTriggered {
            fighter: self.fighter.id,
            trigger: trigger.to_string(),
        };
        self.emit(event);
    }

    pub fn launch_projectile(&mut self, launch: ProjectileLaunch) -> ProjectileId {
        let launcher = launch.launcher;
        let id = self.projectiles.launch(launch);
        if let Some(projectile) = self.projectiles.get(id) {
            crate::log(&format!("🌩️ projectile {:?} launched by {:?}", id, launcher));
            let event = CombatEvent::ProjectileLaunched {
                projectile: id,
                launcher,
                position: projectile.position,
                direction: projectile.direction,
            };
            self.emit(event);
        }
        id
    }

    /// Remove our own projectile without notifying anybody.
    pub fn destroy_projectile(&mut self, id: ProjectileId) -> bool {
        let Some(projectile) = self.projectiles.remove(id) else {
            return false;
        };
        self.emit(CombatEvent::ProjectileVanished {
            projectile: id,
            position: projectile.position,
        });
        true
    }
}
