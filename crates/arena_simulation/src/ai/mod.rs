//! Controllers: who presses the buttons.
//!
//! Controllers only *invoke*: they read a `FighterWatch`, then call
//! `invoke_action` / `turn_and_run` on the `Simulation` before it ticks.

use bevy::prelude::*;

use crate::simulation::CombatCoreSet;

pub mod random_controller;

pub use random_controller::{drive_random_controllers, ControlledFighter, RandomController};

/// AI Plugin
///
/// Регистрирует контроллеры в FixedUpdate перед боевым ядром.
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            drive_random_controllers.before(CombatCoreSet),
        );
    }
}
