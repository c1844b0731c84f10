//! Combat events: what happened during a tick, for presentation and AI.
//!
//! The core pushes them into the session buffer; the bevy plugin forwards
//! them to the `Events<CombatEvent>` queue after every fixed tick.

use bevy::prelude::*;

use crate::actions::ActionKind;
use crate::fighter::{BodyPart, FighterId, HitVolumeId, StaggerLevel};
use crate::projectile::ProjectileId;

#[derive(Event, Debug, Clone, PartialEq)]
pub enum CombatEvent {
    FighterSpawned {
        fighter: FighterId,
        nickname: String,
    },
    FighterDespawned {
        fighter: FighterId,
    },
    StateChanged {
        fighter: FighterId,
        from: String,
        to: String,
    },
    ActionStarted {
        fighter: FighterId,
        slot: usize,
        kind: ActionKind,
    },
    ActionFinished {
        fighter: FighterId,
        slot: usize,
        kind: ActionKind,
    },
    DamageTaken {
        fighter: FighterId,
        amount: u32,
        hp_left: u32,
    },
    Staggered {
        fighter: FighterId,
        level: StaggerLevel,
    },
    StaggerRecovered {
        fighter: FighterId,
    },
    KnockedBack {
        fighter: FighterId,
        impulse: Vec3,
    },
    HitVolumeSpawned {
        fighter: FighterId,
        volume: HitVolumeId,
        part: BodyPart,
    },
    HitVolumeRemoved {
        fighter: FighterId,
        volume: HitVolumeId,
    },
    /// Presentation should play this animation
    AnimationTriggered {
        fighter: FighterId,
        trigger: String,
    },
    GravityToggled {
        fighter: FighterId,
        enabled: bool,
    },
    ProjectileLaunched {
        projectile: ProjectileId,
        launcher: FighterId,
        position: Vec3,
        direction: Vec3,
    },
    ProjectileVanished {
        projectile: ProjectileId,
        position: Vec3,
    },
}

impl CombatEvent {
    /// Fighter the event is about (launcher for projectile launches).
    pub fn fighter(&self) -> Option<FighterId> {
        match self {
            CombatEvent::FighterSpawned { fighter, .. }
            | CombatEvent::FighterDespawned { fighter }
            | CombatEvent::StateChanged { fighter, .. }
            | CombatEvent::ActionStarted { fighter, .. }
            | CombatEvent::ActionFinished { fighter, .. }
            | CombatEvent::DamageTaken { fighter, .. }
            | CombatEvent::Staggered { fighter, .. }
            | CombatEvent::StaggerRecovered { fighter }
            | CombatEvent::KnockedBack { fighter, .. }
            | CombatEvent::HitVolumeSpawned { fighter, .. }
            | CombatEvent::HitVolumeRemoved { fighter, .. }
            | CombatEvent::AnimationTriggered { fighter, .. }
            | CombatEvent::GravityToggled { fighter, .. } => Some(*fighter),
            CombatEvent::ProjectileLaunched { launcher, .. } => Some(*launcher),
            CombatEvent::ProjectileVanished { .. } => None,
        }
    }
}
