//! Fighter actor: state machine owner, body, health, hit volumes, actions.

pub mod fighter;
pub mod health;
pub mod hit_volume;
pub mod motion;

#[cfg(test)]
mod fighter_tests;

pub use fighter::{Fighter, FighterCore, FighterId, StaggerLevel, ACTION_MAX};
pub use health::Health;
pub use hit_volume::{BodyPart, HitVolume, HitVolumeController, HitVolumeId};
pub use motion::{heading_to_forward, horizontal_angle, limit_angle, Body};
