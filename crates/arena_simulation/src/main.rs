//! Headless дуэль
//!
//! Два бойца под random контроллерами, 1000 тиков без рендера

use arena_simulation::{
    create_headless_app, set_log_level, simulation_snapshot, spawn_random_fighter, FighterConfig,
    LogLevel, Simulation,
};
use bevy::prelude::*;

fn main() {
    let seed = 42;
    println!("Starting arena headless duel (seed: {})", seed);

    let mut app = create_headless_app(seed);
    set_log_level(LogLevel::Info);

    let fighters = [
        (FighterConfig::named("pikachu"), Vec3::new(-5.0, 0.0, 0.0), 0.0),
        (FighterConfig::named("raichu"), Vec3::new(5.0, 0.0, 0.0), 180.0),
    ];
    for (config, position, heading) in &fighters {
        if let Err(error) = spawn_random_fighter(&mut app, config, *position, *heading) {
            eprintln!("Failed to spawn {}: {}", config.nickname, error);
            return;
        }
    }

    // Запускаем 1000 тиков симуляции
    for tick in 0..1000 {
        app.update();

        if tick % 100 == 0 {
            let simulation = app.world().resource::<Simulation>();
            for fighter in simulation.fighters() {
                println!(
                    "Tick {}: {} [{}] hp {}/{} at {:?}",
                    tick,
                    fighter.nickname(),
                    fighter.state_name(),
                    fighter.health().current,
                    fighter.health().max,
                    fighter.position()
                );
            }
        }
    }

    let simulation = app.world().resource::<Simulation>();
    println!(
        "Simulation complete! {} ticks, snapshot {} bytes",
        simulation.tick(),
        simulation_snapshot(simulation).len()
    );
}
