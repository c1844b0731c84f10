//! Per-fighter state machine: catalog, current state, preemption stack.
//!
//! # Transition rules
//!
//! ```text
//! request(name):  current.priority > requested.priority → denied (false)
//!                 otherwise push current, notify it, current = requested
//! end(name):      name == current → previous_continuity ? pop (or idle) : idle + clear stack
//!                 name != current → remove the most recent stacked `name`
//! ```
//!
//! Denial is the designed "move unavailable" signal, never an error.

use bevy::prelude::*;

use crate::error::CombatError;
use crate::state::{
    InterruptionSource, MotionParameters, MovementAllowance, State, STATE_IDLE, STATE_STAGGER,
};

/// Record of a state pushed onto the preemption stack whose owner asked to
/// be told about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Interruption {
    pub state: String,
    pub action_number: Option<usize>,
    pub source: InterruptionSource,
}

#[derive(Component, Debug, Clone)]
pub struct StateController {
    current: State,
    /// LIFO, last element is the most recently interrupted state
    preempted: Vec<State>,
    catalog: Vec<State>,
    motion_default: MotionParameters,
    interruptions: Vec<Interruption>,
}

impl Default for StateController {
    fn default() -> Self {
        Self::new(MotionParameters::default())
    }
}

impl StateController {
    pub fn new(motion_default: MotionParameters) -> Self {
        Self {
            current: State::idle(),
            preempted: Vec::new(),
            catalog: vec![State::idle(), State::stagger()],
            motion_default,
            interruptions: Vec::new(),
        }
    }

    pub fn current(&self) -> &State {
        &self.current
    }

    pub fn current_name(&self) -> &str {
        &self.current.name
    }

    pub fn movement(&self) -> MovementAllowance {
        self.current.movement
    }

    pub fn preempted(&self) -> &[State] {
        &self.preempted
    }

    pub fn preempted_depth(&self) -> usize {
        self.preempted.len()
    }

    pub fn catalog(&self) -> &[State] {
        &self.catalog
    }

    pub fn contains(&self, name: &str) -> bool {
        self.catalog.iter().any(|state| state.name == name)
    }

    pub fn is_current(&self, name: &str) -> bool {
        self.current.name == name
    }

    pub fn set_default_motion_parameters(&mut self, motion: MotionParameters) {
        self.motion_default = motion;
    }

    /// Motion parameters of the current state, falling back to the defaults.
    pub fn motion_parameters_current(&self) -> MotionParameters {
        self.current.motion_parameters().unwrap_or(self.motion_default)
    }

    /// Add a state to the catalog. `false` on name duplication (catalog untouched).
    pub fn register_state(&mut self, state: State) -> bool {
        if self.contains(&state.name) {
            crate::log_warning(&format!("state `{}` already registered", state.name));
            return false;
        }

        self.catalog.push(state);
        true
    }

    /// Setup-time check that `name` can be requested.
    pub fn ensure_registered(&self, name: &str) -> Result<(), CombatError> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(CombatError::UnknownState(name.to_string()))
        }
    }

    /// Deregister a state.
    ///
    /// Built-ins and the current state stay; stacked snapshots of a removed
    /// state are purged so it can never be restored.
    pub fn remove_state(&mut self, name: &str) -> bool {
        if name == STATE_IDLE || name == STATE_STAGGER || self.current.name == name {
            return false;
        }

        let before = self.catalog.len();
        self.catalog.retain(|state| state.name != name);
        if self.catalog.len() == before {
            return false;
        }

        self.preempted.retain(|state| state.name != name);
        true
    }

    /// Request a transition, interrupting the current state as *external*.
    pub fn request_state(&mut self, name: &str) -> bool {
        self.request_state_with(name, InterruptionSource::External)
    }

    pub fn request_state_with(&mut self, name: &str, source: InterruptionSource) -> bool {
        let Some(requested) = self.catalog.iter().find(|state| state.name == name).cloned() else {
            crate::log_error(&format!("No state found: {}", name));
            return false;
        };

        self.change_state(requested, source)
    }

    /// Signal that `name` is finished.
    ///
    /// Returns `true` when `name` was current, or when a stacked entry of it
    /// was found and removed.
    pub fn end_state(&mut self, name: &str) -> bool {
        if self.current.name != name {
            // Deferred end of a state that is no longer current
            return self.drop_preempted(name);
        }

        if self.current.previous_continuity {
            self.current = self.preempted.pop().unwrap_or_else(State::idle);
        } else {
            self.current = State::idle();
            self.preempted.clear();
        }

        crate::log(&format!("state: {} started", self.current.name));
        true
    }

    /// Remove the most recent stacked entry of `name`, leaving `current` alone.
    pub fn drop_preempted(&mut self, name: &str) -> bool {
        let Some(index) = self.preempted.iter().rposition(|state| state.name == name) else {
            return false;
        };
        self.preempted.remove(index);
        true
    }

    /// Interruptions recorded since the last drain, oldest first.
    pub fn drain_interruptions(&mut self) -> Vec<Interruption> {
        std::mem::take(&mut self.interruptions)
    }

    fn change_state(&mut self, requested: State, source: InterruptionSource) -> bool {
        if self.current.priority > requested.priority {
            crate::log(&format!(
                "state: {} denied ({} > {})",
                requested.name, self.current.priority, requested.priority
            ));
            return false;
        }

        // Self-request: already there, nothing to stack
        if self.current.name == requested.name {
            return true;
        }

        let interrupted = std::mem::replace(&mut self.current, requested);
        if interrupted.notify_interrupted {
            self.interruptions.push(Interruption {
                state: interrupted.name.clone(),
                action_number: interrupted.action_number,
                source,
            });
        }
        self.preempted.push(interrupted);

        crate::log(&format!("state: {} started", self.current.name));
        true
    }
}
