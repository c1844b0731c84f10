//! Thunderbolt: launch a bolt forward and hold still until it is gone.
//!
//! The state lasts from launch until the bolt vanishes (hit or range). An
//! external interruption destroys the bolt and drops the action; a system
//! interruption leaves it alone so it resumes when the stack pops back.

use serde::{Deserialize, Serialize};

use crate::actions::{ActionContext, ActionKind, FighterAction};
use crate::fighter::StaggerLevel;
use crate::projectile::{ProjectileId, ProjectileLaunch};
use crate::state::{InterruptionSource, MovementAllowance, State, PRIORITY_ACTION};

pub const STATE_THUNDERBOLT: &str = "Thunderbolt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThunderboltProperty {
    pub damage: u32,
    pub speed: f32,
    pub max_distance: f32,
    /// Launch point distance in front of the fighter
    pub launch_offset: f32,
}

impl Default for ThunderboltProperty {
    fn default() -> Self {
        Self {
            damage: 30,
            speed: 10.0,
            max_distance: 100.0,
            launch_offset: 0.5,
        }
    }
}

#[derive(Debug)]
pub struct Thunderbolt {
    property: ThunderboltProperty,
    working: bool,
    states: Vec<State>,
    bolt: Option<ProjectileId>,
}

impl Thunderbolt {
    pub fn new(property: ThunderboltProperty) -> Self {
        Self {
            property,
            working: false,
            states: Vec::new(),
            bolt: None,
        }
    }

    pub fn property(&self) -> &ThunderboltProperty {
        &self.property
    }

    pub fn bolt(&self) -> Option<ProjectileId> {
        self.bolt
    }

    fn launch(&mut self, ctx: &mut ActionContext<'_>) {
        let direction = ctx.fighter.forward();
        let launch = ProjectileLaunch {
            launcher: ctx.fighter_id(),
            slot: ctx.slot,
            damage: self.property.damage,
            stagger: StaggerLevel::Heavy,
            speed: self.property.speed,
            direction,
            position: ctx.fighter.position() + direction * self.property.launch_offset,
            max_distance: self.property.max_distance,
        };
        self.bolt = Some(ctx.launch_projectile(launch));
    }

    fn stop(&mut self, ctx: &mut ActionContext<'_>) {
        if !self.working {
            return;
        }
        self.working = false;
        ctx.end_state(STATE_THUNDERBOLT);
        ctx.action_finished(ActionKind::Thunderbolt);
    }
}

impl FighterAction for Thunderbolt {
    fn kind(&self) -> ActionKind {
        ActionKind::Thunderbolt
    }

    fn is_working(&self) -> bool {
        self.working
    }

    fn states(&mut self) -> &[State] {
        if self.states.is_empty() {
            self.states = vec![State::new(
                STATE_THUNDERBOLT,
                MovementAllowance::STOP,
                PRIORITY_ACTION,
                false,
            )
            .notifying_interruption()];
        }
        &self.states
    }

    fn start(&mut self, ctx: &mut ActionContext<'_>) {
        if self.working {
            return;
        }
        if !ctx.request_state(STATE_THUNDERBOLT) {
            return;
        }

        self.working = true;
        self.launch(ctx);
        ctx.action_started(ActionKind::Thunderbolt);
    }

    fn on_projectile_gone(&mut self, ctx: &mut ActionContext<'_>, projectile: ProjectileId) {
        if self.bolt != Some(projectile) {
            return;
        }
        self.bolt = None;
        self.stop(ctx);
    }

    fn on_interrupted(&mut self, ctx: &mut ActionContext<'_>, source: InterruptionSource) {
        if source.is_system() || !self.working {
            return;
        }

        if let Some(bolt) = self.bolt.take() {
            ctx.destroy_projectile(bolt);
        }
        // Our state sits on the stack now: drop it so nobody restores it
        self.stop(ctx);
    }
}
