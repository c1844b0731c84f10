//! Session-scoped services handed to fighters and actions.
//!
//! Nothing here is global: one [`Simulation`](crate::simulation::Simulation)
//! owns the timers, projectiles and event buffer and lends them out per call.

use crate::fighter::FighterId;
use crate::projectile::Projectiles;
use crate::simulation::CombatEvent;
use crate::timer::TimerManager;

/// What a timer does when it fires. Data, not a closure: the owner is looked
/// up again at dispatch time, so a despawned owner is simply skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCallback {
    /// Forwarded to `FighterAction::on_timer` of the action in `slot`
    Action { fighter: FighterId, slot: usize },
    /// End of a stagger
    StaggerRecovery { fighter: FighterId },
}

impl TimerCallback {
    pub fn fighter(&self) -> FighterId {
        match self {
            TimerCallback::Action { fighter, .. } => *fighter,
            TimerCallback::StaggerRecovery { fighter } => *fighter,
        }
    }
}

pub type SimTimers = TimerManager<TimerCallback>;

pub struct SimContext<'a> {
    pub timers: &'a mut SimTimers,
    pub projectiles: &'a mut Projectiles,
    pub events: &'a mut Vec<CombatEvent>,
}

impl<'a> SimContext<'a> {
    pub fn new(
        timers: &'a mut SimTimers,
        projectiles: &'a mut Projectiles,
        events: &'a mut Vec<CombatEvent>,
    ) -> Self {
        Self {
            timers,
            projectiles,
            events,
        }
    }

    pub fn emit(&mut self, event: CombatEvent) {
        self.events.push(event);
    }
}
