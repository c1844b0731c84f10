//! Bevy glue: the `Simulation` resource ticks in `FixedUpdate`.

use bevy::prelude::*;

use crate::config::SimulationConfig;
use crate::simulation::contacts::{resolve_proximity_contacts, ProximityContacts};
use crate::simulation::{CombatEvent, Simulation};

/// Combat core plugin
///
/// Регистрирует `Simulation` resource и системы в FixedUpdate.
///
/// Порядок выполнения:
/// 1. resolve_proximity_contacts: только headless (есть `ProximityContacts`)
/// 2. advance_simulation: один тик боевого ядра
/// 3. publish_combat_events: буфер событий ядра → Events<CombatEvent>
///
/// Контроллеры (AI, input) пишут в `Simulation` *до* этих систем.
#[derive(Default)]
pub struct CombatCorePlugin {
    pub config: SimulationConfig,
}

impl Plugin for CombatCorePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<Simulation>() {
            app.insert_resource(Simulation::new(self.config.clone()));
        }

        app.add_event::<CombatEvent>().add_systems(
            FixedUpdate,
            (
                resolve_proximity_contacts.run_if(resource_exists::<ProximityContacts>),
                advance_simulation,
                publish_combat_events,
            )
                .chain()
                .in_set(CombatCoreSet),
        );
    }
}

/// Системы боевого ядра (для `.before(CombatCoreSet)` у контроллеров)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CombatCoreSet;

pub fn advance_simulation(mut simulation: ResMut<Simulation>, time: Res<Time<Fixed>>) {
    simulation.advance(time.delta_secs());
}

pub fn publish_combat_events(mut simulation: ResMut<Simulation>, mut events: EventWriter<CombatEvent>) {
    for event in simulation.drain_events() {
        events.write(event);
    }
}
