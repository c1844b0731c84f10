//! Simulation session: fighter registry, timers, projectiles, one tick entry.
//!
//! # Tick order
//!
//! ```text
//! advance(delta):
//!   1. fighters (id order): input edges → action updates
//!   2. projectiles fly; spent ones vanish and notify their action
//!   3. timers advance; fired callbacks dispatched (skipping cancelled ones)
//!   4. per-tick flags reset
//! ```
//!
//! Collision lives outside: the engine reports contacts through
//! `notify_volume_contact` / `notify_projectile_contact` between ticks.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::actions::{ActionKind, FighterAction, HitEffect, HitTarget};
use crate::config::{FighterConfig, SimulationConfig};
use crate::error::CombatError;
use crate::fighter::{horizontal_angle, Fighter, FighterId, HitVolumeId, StaggerLevel};
use crate::projectile::{Projectile, ProjectileContact, ProjectileId, Projectiles};
use crate::state::InterruptionSource;

pub mod contacts;
pub mod context;
pub mod events;
pub mod systems;
pub mod watch;


pub use contacts::ProximityContacts;
pub use context::{SimContext, SimTimers, TimerCallback};
pub use events::CombatEvent;
pub use systems::{advance_simulation, publish_combat_events, CombatCoreSet, CombatCorePlugin};
pub use watch::FighterWatch;

#[derive(Resource, Debug, Default)]
pub struct Simulation {
    config: SimulationConfig,
    fighters: BTreeMap<FighterId, Fighter>,
    next_fighter: u32,
    timers: SimTimers,
    projectiles: Projectiles,
    events: Vec<CombatEvent>,
    tick: u64,
    elapsed: f32,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn timers(&self) -> &SimTimers {
        &self.timers
    }

    pub fn projectiles(&self) -> &Projectiles {
        &self.projectiles
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Registry
    // ========================================================================

    pub fn spawn_fighter(
        &mut self,
        config: &FighterConfig,
        position: Vec3,
        heading: f32,
    ) -> Result<FighterId, CombatError> {
        self.spawn_fighter_with(config, config.build_actions(), position, heading)
    }

    /// Spawn with explicit action objects instead of `config.actions`.
    pub fn spawn_fighter_with(
        &mut self,
        config: &FighterConfig,
        actions: Vec<Box<dyn FighterAction>>,
        position: Vec3,
        heading: f32,
    ) -> Result<FighterId, CombatError> {
        config.validate()?;
        let id = FighterId(self.next_fighter);
        let mut fighter = Fighter::with_actions(id, config, actions)?;
        fighter.place(position, heading);
        self.next_fighter += 1;

        crate::log_info(&format!(
            "🤖 Spawned fighter {:?} `{}` at {:?}",
            id, config.nickname, position
        ));
        self.events.push(CombatEvent::FighterSpawned {
            fighter: id,
            nickname: config.nickname.clone(),
        });
        self.fighters.insert(id, fighter);

        if self.config.one_on_one && self.fighters.len() == 2 {
            self.pair_one_on_one();
        }
        Ok(id)
    }

    /// Remove a fighter with everything it owns (timers, projectiles).
    pub fn despawn_fighter(&mut self, id: FighterId) -> bool {
        if self.fighters.remove(&id).is_none() {
            return false;
        }

        self.timers.unregister_where(|callback| callback.fighter() == id);
        for projectile in self.projectiles.remove_launched_by(id) {
            self.events.push(CombatEvent::ProjectileVanished {
                projectile: projectile.id,
                position: projectile.position,
            });
        }
        for fighter in self.fighters.values_mut() {
            if fighter.target() == Some(id) {
                fighter.set_target(None);
            }
        }

        crate::log_info(&format!("Despawned fighter {:?}", id));
        self.events.push(CombatEvent::FighterDespawned { fighter: id });
        true
    }

    pub fn fighter(&self, id: FighterId) -> Option<&Fighter> {
        self.fighters.get(&id)
    }

    pub fn fighter_ids(&self) -> Vec<FighterId> {
        self.fighters.keys().copied().collect()
    }

    pub fn fighters(&self) -> impl Iterator<Item = &Fighter> {
        self.fighters.values()
    }

    pub fn fighter_count(&self) -> usize {
        self.fighters.len()
    }

    pub fn state_name(&self, id: FighterId) -> Option<&str> {
        self.fighters.get(&id).map(|fighter| fighter.state_name())
    }

    pub fn set_target(&mut self, id: FighterId, target: Option<FighterId>) -> Result<(), CombatError> {
        if let Some(target) = target {
            if !self.fighters.contains_key(&target) {
                return Err(CombatError::UnknownFighter(target));
            }
        }
        let fighter = self
            .fighters
            .get_mut(&id)
            .ok_or(CombatError::UnknownFighter(id))?;
        fighter.set_target(target);
        Ok(())
    }

    fn pair_one_on_one(&mut self) {
        let ids = self.fighter_ids();
        if let &[a, b] = ids.as_slice() {
            if let Some(fighter) = self.fighters.get_mut(&a) {
                fighter.set_target(Some(b));
            }
            if let Some(fighter) = self.fighters.get_mut(&b) {
                fighter.set_target(Some(a));
            }
            crate::log(&format!("one-on-one: {:?} vs {:?}", a, b));
        }
    }

    // ========================================================================
    // Fighter operations
    // ========================================================================

    pub fn invoke_action(&mut self, id: FighterId, slot: usize) -> bool {
        self.fighters
            .get_mut(&id)
            .is_some_and(|fighter| fighter.invoke_action(slot))
    }

    pub fn invoke_action_kind(&mut self, id: FighterId, kind: ActionKind) -> bool {
        self.fighters
            .get_mut(&id)
            .is_some_and(|fighter| fighter.invoke_action_kind(kind))
    }

    pub fn start_action(&mut self, id: FighterId, slot: usize) -> bool {
        let (fighters, mut ctx) = self.split();
        fighters
            .get_mut(&id)
            .is_some_and(|fighter| fighter.start_action(slot, &mut ctx))
    }

    pub fn start_action_kind(&mut self, id: FighterId, kind: ActionKind) -> bool {
        let (fighters, mut ctx) = self.split();
        fighters
            .get_mut(&id)
            .is_some_and(|fighter| fighter.start_action_kind(kind, &mut ctx))
    }

    pub fn run(&mut self, id: FighterId, rate: f32, delta: f32) -> bool {
        self.fighters
            .get_mut(&id)
            .is_some_and(|fighter| fighter.run(rate, delta))
    }

    pub fn turn(&mut self, id: FighterId, degrees: f32, delta: f32) -> f32 {
        self.fighters
            .get_mut(&id)
            .map_or(0.0, |fighter| fighter.turn(degrees, delta))
    }

    pub fn turn_and_run(&mut self, id: FighterId, rate: f32, degrees: f32, delta: f32) -> f32 {
        self.fighters
            .get_mut(&id)
            .map_or(0.0, |fighter| fighter.turn_and_run(rate, degrees, delta))
    }

    /// `relative` is measured from the bearing to the target (0 = straight
    /// at it). Without a target it is measured from the current heading.
    pub fn turn_and_run_from_target(&mut self, id: FighterId, rate: f32, relative: f32, delta: f32) -> f32 {
        let base = self
            .bearing_to_target(id)
            .or_else(|| self.fighters.get(&id).map(|fighter| fighter.heading()));
        match base {
            Some(base) => self.turn_and_run(id, rate, base + relative, delta),
            None => 0.0,
        }
    }

    pub fn take_damage(&mut self, id: FighterId, amount: u32) -> bool {
        let (fighters, mut ctx) = self.split();
        let Some(fighter) = fighters.get_mut(&id) else {
            return false;
        };
        fighter.take_damage(amount, &mut ctx);
        true
    }

    pub fn stagger(&mut self, id: FighterId, level: StaggerLevel, reset_timer: bool, origin: Option<Vec3>) -> bool {
        let (fighters, mut ctx) = self.split();
        fighters
            .get_mut(&id)
            .is_some_and(|fighter| fighter.stagger(level, reset_timer, origin, &mut ctx))
    }

    pub fn request_state(&mut self, id: FighterId, name: &str, source: InterruptionSource) -> bool {
        let (fighters, mut ctx) = self.split();
        fighters
            .get_mut(&id)
            .is_some_and(|fighter| fighter.request_state(name, source, &mut ctx))
    }

    pub fn end_state(&mut self, id: FighterId, name: &str) -> bool {
        let (fighters, mut ctx) = self.split();
        fighters
            .get_mut(&id)
            .is_some_and(|fighter| fighter.end_state(name, &mut ctx))
    }

    /// Drain the knockback impulse accumulated by a fighter.
    pub fn take_impulse(&mut self, id: FighterId) -> Option<Vec3> {
        self.fighters.get_mut(&id).map(|fighter| fighter.take_impulse())
    }

    /// Physics write-back.
    pub fn place_fighter(&mut self, id: FighterId, position: Vec3, heading: f32) -> bool {
        let Some(fighter) = self.fighters.get_mut(&id) else {
            return false;
        };
        fighter.place(position, heading);
        true
    }

    // ========================================================================
    // Collision / presentation notifiers
    // ========================================================================

    /// `owner`'s hit volume touched `target`. Returns whether a hit landed.
    pub fn notify_volume_contact(&mut self, owner: FighterId, volume: HitVolumeId, target: FighterId) -> bool {
        if owner == target {
            return false;
        }
        let Some(target_position) = self.fighters.get(&target).map(|fighter| fighter.position()) else {
            return false;
        };

        let (fighters, mut ctx) = self.split();
        let Some(attacker) = fighters.get_mut(&owner) else {
            return false;
        };
        let Some(slot) = attacker.hit_volume(volume).map(|v| v.slot) else {
            return false;
        };

        let hit = HitTarget {
            id: target,
            position: target_position,
        };
        let Some(effect) = attacker.hit(slot, &hit, &mut ctx) else {
            return false;
        };

        if let Some(target) = fighters.get_mut(&target) {
            apply_hit(target, &effect, &mut ctx);
        }
        true
    }

    /// A projectile touched something. The launcher itself is ignored; any
    /// other contact makes the projectile vanish.
    pub fn notify_projectile_contact(&mut self, id: ProjectileId, contact: ProjectileContact) -> bool {
        let Some(projectile) = self.projectiles.get(id).cloned() else {
            return false;
        };

        if let ProjectileContact::Fighter(target) = contact {
            if target == projectile.launcher {
                return false;
            }

            let (fighters, mut ctx) = self.split();
            if let Some(fighter) = fighters.get_mut(&target) {
                let effect = HitEffect {
                    damage: projectile.damage,
                    stagger: Some(projectile.stagger),
                    reset_stagger_timer: false,
                    origin: Some(projectile.position),
                };
                apply_hit(fighter, &effect, &mut ctx);
            }
        }

        self.projectiles.remove(id);
        self.vanish(projectile);
        true
    }

    /// Animation event from the presentation layer (e.g. swing finished).
    pub fn notify_animation_event(&mut self, id: FighterId, event: &str) -> bool {
        let (fighters, mut ctx) = self.split();
        let Some(fighter) = fighters.get_mut(&id) else {
            return false;
        };
        fighter.on_animation_event(event, &mut ctx);
        true
    }

    // ========================================================================
    // Tick
    // ========================================================================

    pub fn advance(&mut self, delta: f32) {
        self.tick += 1;
        self.elapsed += delta;

        {
            let (fighters, mut ctx) = self.split();
            for fighter in fighters.values_mut() {
                fighter.tick(&mut ctx, delta);
            }
        }

        for projectile in self.projectiles.advance(delta) {
            self.vanish(projectile);
        }

        let fired = self.timers.advance(delta);
        let (fighters, mut ctx) = self.split();
        for (id, callback) in fired {
            // Cancelled or re-armed by an earlier callback this tick
            if !ctx.timers.has_fired(id) {
                continue;
            }
            match fighters.get_mut(&callback.fighter()) {
                Some(fighter) => fighter.on_timer(id, callback, &mut ctx),
                None => {
                    ctx.timers.unregister(id);
                }
            }
        }

        for fighter in fighters.values_mut() {
            fighter.end_tick();
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn watch(&self, id: FighterId) -> Option<FighterWatch> {
        let fighter = self.fighters.get(&id)?;
        let target = fighter.target().and_then(|target| self.fighters.get(&target));
        let position = fighter.position();

        Some(FighterWatch {
            fighter: id,
            nickname: fighter.nickname().to_string(),
            state: fighter.state_name().to_string(),
            movable: fighter.states().current().movable(),
            position: position.to_array(),
            heading: fighter.heading(),
            hp_ratio: fighter.hp_ratio(),
            target: fighter.target(),
            distance_to_target: target.map(|t| position.distance(t.position())),
            bearing_to_target: target.map(|t| horizontal_angle(t.position() - position)),
        })
    }

    pub fn bearing_to_target(&self, id: FighterId) -> Option<f32> {
        let fighter = self.fighters.get(&id)?;
        let target = self.fighters.get(&fighter.target()?)?;
        Some(horizontal_angle(target.position() - fighter.position()))
    }

    /// Session teardown: fighters, timers, projectiles, pending events.
    pub fn clear(&mut self) {
        self.fighters.clear();
        self.timers.clear();
        self.projectiles.clear();
        self.events.clear();
        crate::log("simulation cleared");
    }

    fn vanish(&mut self, projectile: Projectile) {
        crate::log(&format!("projectile {:?} vanished", projectile.id));
        self.events.push(CombatEvent::ProjectileVanished {
            projectile: projectile.id,
            position: projectile.position,
        });

        let (fighters, mut ctx) = self.split();
        if let Some(owner) = fighters.get_mut(&projectile.launcher) {
            owner.on_projectile_gone(projectile.slot, projectile.id, &mut ctx);
        }
    }

    fn split(&mut self) -> (&mut BTreeMap<FighterId, Fighter>, SimContext<'_>) {
        (
            &mut self.fighters,
            SimContext::new(&mut self.timers, &mut self.projectiles, &mut self.events),
        )
    }
}

fn apply_hit(target: &mut Fighter, effect: &HitEffect, ctx: &mut SimContext<'_>) {
    target.take_damage(effect.damage, ctx);
    if let Some(level) = effect.stagger {
        target.stagger(level, effect.reset_stagger_timer, effect.origin, ctx);
    }
}
