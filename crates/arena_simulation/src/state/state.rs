//! State descriptor: one behavioral mode of a fighter.
//!
//! A `State` is built once (by the controller for the built-ins, by an action
//! for its own modes) and then stored by value in the controller catalog.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Имя базового состояния (ничего не делаем)
pub const STATE_IDLE: &str = "idle";
/// Имя состояния оглушения
pub const STATE_STAGGER: &str = "stagger";

/// Priority levels (coarse total order).
///
/// A request succeeds if `requested >= current`, so equal priorities resolve
/// last-request-wins.
pub const PRIORITY_IDLE: i32 = 1;
pub const PRIORITY_ACTION: i32 = 20;
pub const PRIORITY_STAGGER: i32 = 70;
pub const PRIORITY_MAX: i32 = 100;

/// What basic movement is allowed while a state is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub struct MovementAllowance {
    pub running: bool,
    pub jumping: bool,
    pub turning: bool,
    pub action: bool,
}

impl MovementAllowance {
    pub const FREE: Self = Self::new(true, true, true, true);
    pub const STOP: Self = Self::new(false, false, false, false);

    pub const fn new(running: bool, jumping: bool, turning: bool, action: bool) -> Self {
        Self {
            running,
            jumping,
            turning,
            action,
        }
    }

    pub fn all_allowed(&self) -> bool {
        self.running && self.jumping && self.turning && self.action
    }

    pub fn all_prohibited(&self) -> bool {
        !self.running && !self.jumping && !self.turning && !self.action
    }

    /// Informational classification, nothing is gated on it.
    pub fn movable(&self) -> MovableLevel {
        if self.all_allowed() {
            MovableLevel::Free
        } else if self.all_prohibited() {
            MovableLevel::Stop
        } else {
            MovableLevel::Limited
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum MovableLevel {
    Free,
    Limited,
    Stop,
}

/// Locomotion speeds of a fighter.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct MotionParameters {
    /// Метры в секунду
    pub running_speed: f32,
    /// Градусы в секунду
    pub turning_speed: f32,
}

impl MotionParameters {
    pub fn new(running_speed: f32, turning_speed: f32) -> Self {
        Self {
            running_speed,
            turning_speed,
        }
    }
}

impl Default for MotionParameters {
    fn default() -> Self {
        Self::new(5.0, 360.0)
    }
}

/// Who drove an interruption.
///
/// `System` interruptions come from sequence-level requests and the
/// interrupted state is expected to resume on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionSource {
    External,
    System,
}

impl InterruptionSource {
    pub fn is_system(&self) -> bool {
        matches!(self, InterruptionSource::System)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub name: String,
    pub priority: i32,
    pub movement: MovementAllowance,
    /// Ending this state pops the preemption stack instead of going idle.
    pub previous_continuity: bool,
    /// Slot of the owning action, `None` for system states (idle, stagger).
    pub action_number: Option<usize>,
    /// Owner wants to hear about being pushed onto the preemption stack.
    pub notify_interrupted: bool,
    /// `None` → fighter keeps its default motion parameters.
    motion_parameters: Option<MotionParameters>,
}

impl State {
    pub fn new(
        name: impl Into<String>,
        movement: MovementAllowance,
        priority: i32,
        previous_continuity: bool,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            movement,
            previous_continuity,
            action_number: None,
            notify_interrupted: false,
            motion_parameters: None,
        }
    }

    /// Override locomotion speeds while this state is current.
    pub fn with_motion_parameters(mut self, motion: MotionParameters) -> Self {
        self.motion_parameters = Some(motion);
        self
    }

    pub fn notifying_interruption(mut self) -> Self {
        self.notify_interrupted = true;
        self
    }

    pub fn uses_default_motion_parameters(&self) -> bool {
        self.motion_parameters.is_none()
    }

    pub fn motion_parameters(&self) -> Option<MotionParameters> {
        self.motion_parameters
    }

    pub fn movable(&self) -> MovableLevel {
        self.movement.movable()
    }

    pub(crate) fn idle() -> Self {
        Self::new(STATE_IDLE, MovementAllowance::FREE, PRIORITY_IDLE, false)
    }

    pub(crate) fn stagger() -> Self {
        Self::new(STATE_STAGGER, MovementAllowance::STOP, PRIORITY_STAGGER, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movable_level() {
        assert_eq!(MovementAllowance::FREE.movable(), MovableLevel::Free);
        assert_eq!(MovementAllowance::STOP.movable(), MovableLevel::Stop);
        assert_eq!(
            MovementAllowance::new(true, false, false, false).movable(),
            MovableLevel::Limited
        );
    }

    #[test]
    fn test_builtin_states() {
        let idle = State::idle();
        assert_eq!(idle.priority, PRIORITY_IDLE);
        assert!(!idle.previous_continuity);
        assert!(idle.uses_default_motion_parameters());

        let stagger = State::stagger();
        assert_eq!(stagger.priority, PRIORITY_STAGGER);
        assert!(stagger.previous_continuity);
        assert_eq!(stagger.movable(), MovableLevel::Stop);
    }

    #[test]
    fn test_motion_override() {
        let dash = State::new("Dashing", MovementAllowance::STOP, PRIORITY_ACTION, false)
            .with_motion_parameters(MotionParameters::new(12.0, 90.0));
        assert!(!dash.uses_default_motion_parameters());
        assert_eq!(dash.motion_parameters().map(|m| m.running_speed), Some(12.0));
    }
}
