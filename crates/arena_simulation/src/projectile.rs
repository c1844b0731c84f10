//! Projectiles launched by actions (Thunderbolt bolt).
//!
//! Uniform linear motion until any contact or `max_distance`. Contacts are
//! reported by the collision layer via `Simulation::notify_projectile_contact`.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::fighter::{FighterId, StaggerLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(pub u32);

/// What a projectile touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileContact {
    Fighter(FighterId),
    /// Terrain, walls, anything that is not a fighter
    Obstacle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    pub launcher: FighterId,
    /// Action slot of the launcher that owns the projectile
    pub slot: usize,
    pub damage: u32,
    pub stagger: StaggerLevel,
    /// Метры в секунду
    pub speed: f32,
    /// Unit vector
    pub direction: Vec3,
    pub position: Vec3,
    pub max_distance: f32,
    pub flown: f32,
}

impl Projectile {
    pub fn fly(&mut self, delta: f32) {
        let step = self.speed * delta;
        self.position += self.direction * step;
        self.flown += step;
    }

    pub fn is_spent(&self) -> bool {
        self.flown >= self.max_distance
    }
}

/// Launch parameters, the registry assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileLaunch {
    pub launcher: FighterId,
    pub slot: usize,
    pub damage: u32,
    pub stagger: StaggerLevel,
    pub speed: f32,
    pub direction: Vec3,
    pub position: Vec3,
    pub max_distance: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Projectiles {
    live: BTreeMap<ProjectileId, Projectile>,
    next_id: u32,
}

impl Projectiles {
    pub fn launch(&mut self, launch: ProjectileLaunch) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id += 1;

        let direction = launch.direction.normalize_or_zero();
        self.live.insert(
            id,
            Projectile {
                id,
                launcher: launch.launcher,
                slot: launch.slot,
                damage: launch.damage,
                stagger: launch.stagger,
                speed: launch.speed,
                direction,
                position: launch.position,
                max_distance: launch.max_distance,
                flown: 0.0,
            },
        );
        id
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.live.get(&id)
    }

    pub fn remove(&mut self, id: ProjectileId) -> Option<Projectile> {
        self.live.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.live.values()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Drop every projectile launched by `launcher`, returning them.
    pub fn remove_launched_by(&mut self, launcher: FighterId) -> Vec<Projectile> {
        let ids: Vec<_> = self
            .live
            .values()
            .filter(|p| p.launcher == launcher)
            .map(|p| p.id)
            .collect();
        ids.into_iter().filter_map(|id| self.live.remove(&id)).collect()
    }

    /// Move every projectile; spent ones are removed and returned.
    pub fn advance(&mut self, delta: f32) -> Vec<Projectile> {
        let mut spent = Vec::new();
        for projectile in self.live.values_mut() {
            projectile.fly(delta);
            if projectile.is_spent() {
                spent.push(projectile.id);
            }
        }
        spent.into_iter().filter_map(|id| self.live.remove(&id)).collect()
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }
}
