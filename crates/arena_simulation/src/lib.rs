//! Arena Simulation Core
//!
//! Боевое ядро файтинга: state machine с приоритетами и стеком прерываний,
//! таймеры, жизненный цикл действий (start / continue / end), stagger между бойцами.
//!
//! Architecture:
//! - Core = plain Rust (`Simulation`): детерминированный tick, без глобального состояния
//! - Bevy = обвязка: fixed timestep, AI контроллеры, events для презентации
//! - Collision / animation снаружи: сообщают контакты через `notify_*`

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod actions;
pub mod ai;
pub mod config;
pub mod error;
pub mod fighter;
pub mod logger;
pub mod projectile;
pub mod simulation;
pub mod state;
pub mod timer;

// Re-export основных типов
pub use actions::{ActionContext, ActionKind, FighterAction, HitEffect, HitTarget};
pub use ai::{AIPlugin, ControlledFighter, RandomController};
pub use config::{ActionSpec, FighterConfig, SimulationConfig, StaggerConfig};
pub use error::CombatError;
pub use fighter::{Fighter, FighterId, StaggerLevel, ACTION_MAX};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel,
    LogPrinter,
};
pub use projectile::{ProjectileContact, ProjectileId};
pub use simulation::{CombatCorePlugin, CombatEvent, FighterWatch, ProximityContacts, Simulation};
pub use state::{InterruptionSource, MovementAllowance, State, StateController};
pub use timer::{TimerId, TimerManager};

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: SimulationConfig,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep из конфига (60Hz по умолчанию)
            .insert_resource(Time::<Fixed>::from_hz(self.config.tick_hz))
            .add_plugins((
                CombatCorePlugin {
                    config: self.config.clone(),
                },
                AIPlugin,
            ));

        // Seed от create_headless_app не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(self.config.seed));
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed для дочернего RNG (контроллеры и т.п.)
    pub fn fork_seed(&mut self) -> u64 {
        self.rng.gen()
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время идёт ровно на один fixed tick за `app.update()`, независимо от
/// wall clock: прогоны с одним seed воспроизводимы.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();

    let config = SimulationConfig {
        seed,
        ..Default::default()
    };
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(ProximityContacts::default())
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / config.tick_hz,
        )))
        .add_plugins(SimulationPlugin { config });

    app
}

/// Spawn a fighter driven by a `RandomController` seeded from the app RNG.
pub fn spawn_random_fighter(
    app: &mut App,
    config: &FighterConfig,
    position: Vec3,
    heading: f32,
) -> Result<FighterId, CombatError> {
    let world = app.world_mut();
    let id = world
        .resource_mut::<Simulation>()
        .spawn_fighter(config, position, heading)?;
    let seed = world.resource_mut::<DeterministicRng>().fork_seed();
    world.spawn((ControlledFighter(id), RandomController::new(seed)));
    Ok(id)
}

/// Snapshot симуляции для сравнения детерминизма
pub fn simulation_snapshot(simulation: &Simulation) -> Vec<u8> {
    let mut snapshot = Vec::new();

    // BTreeMap: бойцы уже по FighterId
    for fighter in simulation.fighters() {
        snapshot.extend_from_slice(&fighter.id().0.to_le_bytes());
        snapshot.extend_from_slice(fighter.state_name().as_bytes());
        snapshot.extend_from_slice(&fighter.health().current.to_le_bytes());
        for value in fighter.position().to_array() {
            snapshot.extend_from_slice(&value.to_le_bytes());
        }
        snapshot.extend_from_slice(&fighter.heading().to_le_bytes());
    }
    snapshot.extend_from_slice(&(simulation.projectiles().len() as u32).to_le_bytes());

    snapshot
}
