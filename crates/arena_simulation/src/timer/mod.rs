//! Deferred callbacks driven once per tick.

pub mod manager;
pub mod timer;


pub use manager::{TimerId, TimerManager};
pub use timer::Timer;
