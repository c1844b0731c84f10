//! Random controller: a scripted opponent for headless duels.
//!
//! Reads the fighter's [`FighterWatch`] each tick and feeds input into the
//! simulation the same way a player or a learned policy would.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::actions::tackle::STATE_DASHING;
use crate::actions::ActionKind;
use crate::fighter::FighterId;
use crate::simulation::Simulation;
use crate::state::STATE_IDLE;

/// Which fighter this entity drives
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlledFighter(pub FighterId);

#[derive(Component, Debug, Clone)]
pub struct RandomController {
    rng: ChaCha8Rng,
    /// Target closer than this → tail swing (метры)
    pub iron_tail_range: f32,
    /// Chance per idle tick to fire an action at range
    pub action_chance: f32,
    /// Chance per tick to keep holding a dash
    pub dash_hold_chance: f32,
    /// Random weave around the direct approach (градусы)
    pub weave: f32,
}

impl RandomController {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            iron_tail_range: 1.5,
            action_chance: 0.02,
            dash_hold_chance: 0.8,
            weave: 30.0,
        }
    }

    /// Decide and apply this tick's input.
    pub fn drive(&mut self, simulation: &mut Simulation, fighter: FighterId, delta: f32) {
        let Some(watch) = simulation.watch(fighter) else {
            return;
        };

        if watch.state == STATE_DASHING {
            if self.rng.gen_bool(self.dash_hold_chance as f64) {
                simulation.invoke_action_kind(fighter, ActionKind::Tackle);
            }
            return;
        }
        if watch.state != STATE_IDLE {
            return;
        }

        match watch.distance_to_target {
            Some(distance) if distance <= self.iron_tail_range => {
                simulation.invoke_action_kind(fighter, ActionKind::IronTail);
            }
            Some(_) => {
                let roll: f32 = self.rng.gen();
                if roll < self.action_chance * 0.5 {
                    simulation.invoke_action_kind(fighter, ActionKind::Thunderbolt);
                } else if roll < self.action_chance {
                    simulation.invoke_action_kind(fighter, ActionKind::Tackle);
                } else {
                    let offset = self.rng.gen_range(-self.weave..=self.weave);
                    simulation.turn_and_run_from_target(fighter, 1.0, offset, delta);
                }
            }
            None => {
                let heading = self.rng.gen_range(-180.0..180.0);
                simulation.turn_and_run(fighter, 0.5, heading, delta);
            }
        }
    }
}

/// Система: random controllers → Simulation input
pub fn drive_random_controllers(
    mut simulation: ResMut<Simulation>,
    mut controllers: Query<(&ControlledFighter, &mut RandomController)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    // Порядок по FighterId: Query order не гарантирован
    let mut controllers: Vec<_> = controllers.iter_mut().collect();
    controllers.sort_by_key(|(controlled, _)| controlled.0);

    for (controlled, mut controller) in controllers {
        controller.drive(&mut simulation, controlled.0, delta);
    }
}
