//! Iron Tail: a tail swing. Frozen while it lasts, lands at most one hit.
//!
//! The swing ends on the animation's finish event, or after `duration` when
//! nobody plays the animation (headless runs).

use serde::{Deserialize, Serialize};

use crate::actions::{ActionContext, ActionKind, FighterAction, HitEffect, HitTarget};
use crate::fighter::{BodyPart, HitVolumeId, StaggerLevel};
use crate::state::{MovementAllowance, State, PRIORITY_ACTION};
use crate::timer::TimerId;

pub const STATE_IRON_TAIL: &str = "IronTail";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IronTailProperty {
    pub damage: u32,
    /// Swing length when no animation reports its end
    pub duration: f32,
    pub animation_trigger: String,
    pub animation_event_finished: String,
}

impl Default for IronTailProperty {
    fn default() -> Self {
        Self {
            damage: 10,
            duration: 0.8,
            animation_trigger: "StartIronTail".to_string(),
            animation_event_finished: "finished".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct IronTail {
    property: IronTailProperty,
    working: bool,
    states: Vec<State>,
    volume: Option<HitVolumeId>,
    swing_timer: Option<TimerId>,
    hit_landed: bool,
}

impl IronTail {
    pub fn new(property: IronTailProperty) -> Self {
        Self {
            property,
            working: false,
            states: Vec::new(),
            volume: None,
            swing_timer: None,
            hit_landed: false,
        }
    }

    pub fn property(&self) -> &IronTailProperty {
        &self.property
    }

    fn finish(&mut self, ctx: &mut ActionContext<'_>) {
        if !self.working {
            return;
        }
        self.working = false;

        ctx.end_state(STATE_IRON_TAIL);
        ctx.set_gravity(true);
        ctx.remove_hit_volume(&mut self.volume);
        ctx.cancel_timer(&mut self.swing_timer);

        ctx.action_finished(ActionKind::IronTail);
    }
}

impl FighterAction for IronTail {
    fn kind(&self) -> ActionKind {
        ActionKind::IronTail
    }

    fn is_working(&self) -> bool {
        self.working
    }

    fn states(&mut self) -> &[State] {
        if self.states.is_empty() {
            self.states = vec![State::new(
                STATE_IRON_TAIL,
                MovementAllowance::STOP,
                PRIORITY_ACTION,
                false,
            )];
        }
        &self.states
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        if self.working {
            return;
        }
        if !ctx.request_state(STATE_IRON_TAIL) {
            return;
        }

        self.working = true;
        self.hit_landed = false;

        ctx.trigger_animation(&self.property.animation_trigger);
        self.swing_timer = Some(ctx.start_timer(self.property.duration));
        self.volume = Some(ctx.spawn_hit_volume(BodyPart::Tail));
        // Анимация сама двигает хвост по высоте
        ctx.set_gravity(false);

        ctx.action_started(ActionKind::IronTail);
    }

    fn on_timer(&mut self, ctx: &mut ActionContext<'_>, _timer: TimerId) {
        self.finish(ctx);
    }

    fn on_animation_event(&mut self, ctx: &mut ActionContext<'_>, event: &str) {
        if event == self.property.animation_event_finished {
            self.finish(ctx);
        }
    }

    fn on_hit(&mut self, ctx: &mut ActionContext<'_>, _target: &HitTarget) -> Option<HitEffect> {
        // One hit per swing, and only while the swing is current
        if !self.working || self.hit_landed || !ctx.fighter.states.is_current(STATE_IRON_TAIL) {
            return None;
        }
        self.hit_landed = true;

        Some(HitEffect {
            damage: self.property.damage,
            stagger: Some(StaggerLevel::Blown),
            reset_stagger_timer: false,
            origin: Some(ctx.fighter.position()),
        })
    }
}
