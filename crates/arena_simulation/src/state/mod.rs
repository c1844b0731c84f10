//! Fighter state machine (states, priorities, preemption stack).

pub mod controller;
pub mod state;

#[cfg(test)]
mod controller_tests;

pub use controller::{Interruption, StateController};
pub use state::*;
