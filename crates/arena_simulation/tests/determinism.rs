//! Determinism test
//!
//! Запускаем дуэль 3 раза с одинаковым seed, сравниваем snapshots.
//! Если snapshots разные → недетерминизм (порядок систем, HashMap итерация, wall clock).

use bevy::prelude::*;
use arena_simulation::*;

const TICKS: usize = 300;

/// Test: 3 прогона с одним seed дают одинаковый результат
#[test]
fn test_determinism_same_seed() {
    let seed = 42;

    let snapshot1 = run_duel(seed, TICKS);
    let snapshot2 = run_duel(seed, TICKS);
    let snapshot3 = run_duel(seed, TICKS);

    assert_eq!(snapshot1, snapshot2, "Run 1 и 2 разошлись: недетерминизм");
    assert_eq!(snapshot2, snapshot3, "Run 2 и 3 разошлись: недетерминизм");

    arena_simulation::logger::log("✓ Determinism test passed: 3 runs identical");
}

/// Test: события тоже детерминированы (порядок и содержимое)
#[test]
fn test_determinism_event_log() {
    let first = run_duel_events(7, TICKS);
    let second = run_duel_events(7, TICKS);

    assert!(!first.is_empty(), "Дуэль без событий");
    assert_eq!(first, second, "Лог событий разошёлся");
}

/// Test: разные seeds → обычно разные результаты
#[test]
fn test_different_seeds_produce_different_results() {
    let snapshot1 = run_duel(42, TICKS);
    let snapshot2 = run_duel(1337, TICKS);

    // Совпадение возможно, но крайне маловероятно: не фейлим, только логируем
    if snapshot1 == snapshot2 {
        arena_simulation::logger::log_warning("Seeds 42 и 1337 дали одинаковый snapshot");
    }
}

/// Test: fixed timestep реально тикает от app.update()
#[test]
fn test_fixed_update_advances() {
    let mut app = create_duel_app(42);

    for _ in 0..10 {
        app.update();
    }

    let simulation = app.world().resource::<Simulation>();
    assert!(simulation.tick() > 0, "FixedUpdate не запускался");
    assert!(simulation.elapsed() > 0.0);
}

// --- Helpers ---

fn create_duel_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);

    spawn_random_fighter(&mut app, &FighterConfig::named("pikachu"), Vec3::new(-4.0, 0.0, 0.0), 0.0)
        .expect("spawn pikachu");
    spawn_random_fighter(&mut app, &FighterConfig::named("raichu"), Vec3::new(4.0, 0.0, 0.0), 180.0)
        .expect("spawn raichu");

    app
}

fn run_duel(seed: u64, ticks: usize) -> Vec<u8> {
    let mut app = create_duel_app(seed);

    for _ in 0..ticks {
        app.update();
    }

    simulation_snapshot(app.world().resource::<Simulation>())
}

/// Все CombatEvent за прогон, в порядке публикации
fn run_duel_events(seed: u64, ticks: usize) -> Vec<CombatEvent> {
    let mut app = create_duel_app(seed);
    let mut log = Vec::new();

    for _ in 0..ticks {
        app.update();
        let mut events = app.world_mut().resource_mut::<Events<CombatEvent>>();
        log.extend(events.drain());
    }

    log
}
