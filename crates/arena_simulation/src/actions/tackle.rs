//! Tackle: dash forward while the input is held, bounce off whoever we hit.
//!
//! ```text
//! start ──► Dashing (run only, custom speed) ──timer──► idle
//!              │ hit
//!              ▼
//!           DashKnockback (frozen, stagger priority) ──timer──► idle
//! ```

use serde::{Deserialize, Serialize};

use crate::actions::{ActionContext, ActionKind, FighterAction, HitEffect, HitTarget};
use crate::fighter::{BodyPart, HitVolumeId, StaggerLevel};
use crate::state::{
    InterruptionSource, MotionParameters, MovementAllowance, State, PRIORITY_ACTION,
    PRIORITY_STAGGER,
};
use crate::timer::TimerId;

pub const STATE_DASHING: &str = "Dashing";
pub const STATE_DASH_KNOCKBACK: &str = "DashKnockback";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TackleProperty {
    /// Running speed while dashing
    pub speed: f32,
    /// Turning speed while dashing (°/s)
    pub turn_speed: f32,
    /// Dash length, re-armed while the input is held
    pub duration: f32,
    pub damage: u32,
    pub knockback_duration: f32,
    pub knockback_horizontal: f32,
    pub knockback_up: f32,
}

impl Default for TackleProperty {
    fn default() -> Self {
        Self {
            speed: 12.0,
            turn_speed: 90.0,
            duration: 0.6,
            damage: 20,
            knockback_duration: 0.5,
            knockback_horizontal: 4.0,
            knockback_up: 3.0,
        }
    }
}

#[derive(Debug)]
pub struct Tackle {
    property: TackleProperty,
    working: bool,
    states: Vec<State>,
    volume: Option<HitVolumeId>,
    dash_timer: Option<TimerId>,
    knockback_timer: Option<TimerId>,
}

impl Tackle {
    pub fn new(property: TackleProperty) -> Self {
        Self {
            property,
            working: false,
            states: Vec::new(),
            volume: None,
            dash_timer: None,
            knockback_timer: None,
        }
    }

    pub fn property(&self) -> &TackleProperty {
        &self.property
    }

    pub fn is_knocked_back(&self) -> bool {
        self.knockback_timer.is_some()
    }

    fn finish(&mut self, ctx: &mut ActionContext<'_>) {
        if !self.working {
            return;
        }
        self.working = false;

        ctx.remove_hit_volume(&mut self.volume);
        ctx.end_state(STATE_DASHING);
        ctx.end_state(STATE_DASH_KNOCKBACK);
        ctx.cancel_timer(&mut self.dash_timer);
        ctx.cancel_timer(&mut self.knockback_timer);

        ctx.action_finished(ActionKind::Tackle);
    }

    /// Dashed through the target: step back to our side of it.
    fn fix_penetration(ctx: &mut ActionContext<'_>, target: &HitTarget) {
        let relative = target.position - ctx.fighter.position();
        if relative.dot(ctx.fighter.forward()) > 0.0 {
            return;
        }
        ctx.fighter.body.position += relative * 2.0;
    }
}

impl FighterAction for Tackle {
    fn kind(&self) -> ActionKind {
        ActionKind::Tackle
    }

    fn is_working(&self) -> bool {
        self.working
    }

    fn states(&mut self) -> &[State] {
        if self.states.is_empty() {
            let dashing = State::new(
                STATE_DASHING,
                MovementAllowance::new(true, false, false, false),
                PRIORITY_ACTION,
                false,
            )
            .with_motion_parameters(MotionParameters::new(
                self.property.speed,
                self.property.turn_speed,
            ))
            .notifying_interruption();

            let knockback = State::new(
                STATE_DASH_KNOCKBACK,
                MovementAllowance::STOP,
                PRIORITY_STAGGER,
                false,
            );

            self.states = vec![dashing, knockback];
        }
        &self.states
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        if self.working {
            return;
        }
        if !ctx.request_state(STATE_DASHING) {
            return;
        }

        self.working = true;
        self.volume = Some(ctx.spawn_hit_volume(BodyPart::Body));
        self.dash_timer = Some(ctx.start_timer(self.property.duration));
        ctx.action_started(ActionKind::Tackle);
    }

    fn continue_action(&mut self, ctx: &mut ActionContext<'_>) {
        if !self.working || self.is_knocked_back() {
            return;
        }
        ctx.rearm_timer(&mut self.dash_timer, self.property.duration);
    }

    fn update(&mut self, ctx: &mut ActionContext<'_>, delta: f32) {
        if !self.working || !ctx.fighter.states.is_current(STATE_DASHING) {
            return;
        }
        // Controller did not steer this tick: keep dashing straight
        if !ctx.fighter.body.ran_this_tick {
            ctx.fighter.run(1.0, delta);
        }
    }

    fn on_timer(&mut self, ctx: &mut ActionContext<'_>, _timer: TimerId) {
        self.finish(ctx);
    }

    fn on_hit(&mut self, ctx: &mut ActionContext<'_>, target: &HitTarget) -> Option<HitEffect> {
        // Frozen dash (stagger on top) keeps its volume but cannot hit
        if !self.working || self.is_knocked_back() || !ctx.fighter.states.is_current(STATE_DASHING) {
            return None;
        }

        Self::fix_penetration(ctx, target);
        ctx.cancel_timer(&mut self.dash_timer);

        ctx.request_state(STATE_DASH_KNOCKBACK);
        ctx.knock_back(
            target.position,
            self.property.knockback_horizontal,
            self.property.knockback_up,
        );
        self.knockback_timer = Some(ctx.start_timer(self.property.knockback_duration));

        Some(HitEffect {
            damage: self.property.damage,
            stagger: Some(StaggerLevel::Blown),
            reset_stagger_timer: false,
            origin: Some(ctx.fighter.position()),
        })
    }

    fn on_interrupted(&mut self, ctx: &mut ActionContext<'_>, source: InterruptionSource) {
        crate::log(&format!(
            "{} dash interrupted ({:?})",
            ctx.fighter.nickname, source
        ));
    }
}
