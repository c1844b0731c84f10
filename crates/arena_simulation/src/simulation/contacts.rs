//! Headless stand-in for the collision layer.
//!
//! With a real engine attached, its physics reports contacts and drains
//! impulses itself. Without one, these distance checks keep duels alive.

use bevy::prelude::*;

use crate::fighter::{BodyPart, FighterId, HitVolumeId};
use crate::projectile::{ProjectileContact, ProjectileId};
use crate::simulation::Simulation;

#[derive(Resource, Debug, Clone, Copy)]
pub struct ProximityContacts {
    /// Body volume reach (метры)
    pub body_reach: f32,
    /// Tail volume reach (метры)
    pub tail_reach: f32,
    pub projectile_radius: f32,
    /// Доля импульса, переводимая в смещение за тик
    pub impulse_slide: f32,
}

impl Default for ProximityContacts {
    fn default() -> Self {
        Self {
            body_reach: 1.0,
            tail_reach: 1.6,
            projectile_radius: 0.5,
            impulse_slide: 0.1,
        }
    }
}

impl ProximityContacts {
    fn reach(&self, part: BodyPart) -> f32 {
        match part {
            BodyPart::Body => self.body_reach,
            BodyPart::Tail => self.tail_reach,
        }
    }

    /// Report every volume / projectile overlapping a fighter. Returns the
    /// number of contacts that landed.
    pub fn detect(&self, simulation: &mut Simulation) -> usize {
        let mut volume_contacts: Vec<(FighterId, HitVolumeId, FighterId)> = Vec::new();
        let mut projectile_contacts: Vec<(ProjectileId, FighterId)> = Vec::new();

        for owner in simulation.fighters() {
            for (volume, hit_volume) in owner.core().hit_volumes.iter() {
                let reach = self.reach(hit_volume.part);
                for other in simulation.fighters() {
                    if other.id() != owner.id() && owner.position().distance(other.position()) <= reach {
                        volume_contacts.push((owner.id(), volume, other.id()));
                    }
                }
            }
        }
        for projectile in simulation.projectiles().iter() {
            let touched = simulation.fighters().find(|fighter| {
                fighter.id() != projectile.launcher
                    && fighter.position().distance(projectile.position) <= self.projectile_radius
            });
            if let Some(fighter) = touched {
                projectile_contacts.push((projectile.id, fighter.id()));
            }
        }

        let mut landed = 0;
        for (owner, volume, target) in volume_contacts {
            if simulation.notify_volume_contact(owner, volume, target) {
                landed += 1;
            }
        }
        for (projectile, target) in projectile_contacts {
            if simulation.notify_projectile_contact(projectile, ProjectileContact::Fighter(target)) {
                landed += 1;
            }
        }
        landed
    }

    /// Drain knockback impulses into a horizontal slide.
    pub fn slide(&self, simulation: &mut Simulation) {
        for id in simulation.fighter_ids() {
            let Some(impulse) = simulation.take_impulse(id) else {
                continue;
            };
            let Some(fighter) = simulation.fighter(id) else {
                continue;
            };
            let position = fighter.position() + Vec3::new(impulse.x, 0.0, impulse.z) * self.impulse_slide;
            let heading = fighter.heading();
            simulation.place_fighter(id, position, heading);
        }
    }
}

/// Система: proximity contacts + knockback slide (headless)
pub fn resolve_proximity_contacts(mut simulation: ResMut<Simulation>, contacts: Res<ProximityContacts>) {
    contacts.detect(&mut simulation);
    contacts.slide(&mut simulation);
}
