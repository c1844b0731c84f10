//! One-shot countdown with a callback payload.
//!
//! The callback is plain data (`C`), handed to a sink exactly once when the
//! countdown crosses zero. Whoever owns the sink decides what "calling" it
//! means (the simulation dispatches it back into fighters).

#[derive(Debug, Clone, PartialEq)]
pub struct Timer<C> {
    /// Seconds left
    remaining: f32,
    /// One-shot latch, cleared only by `set_time`
    ignited: bool,
    callback: C,
}

impl<C: Copy> Timer<C> {
    pub fn new(duration: f32, callback: C) -> Self {
        Self {
            remaining: duration,
            ignited: false,
            callback,
        }
    }

    /// Advance by `delta` seconds.
    ///
    /// Hands the callback to `ignite` the first time the countdown reaches
    /// zero. Returns whether the timer is finished (stays `true` afterwards).
    pub fn advance(&mut self, delta: f32, mut ignite: impl FnMut(C)) -> bool {
        self.remaining -= delta;
        if self.remaining <= 0.0 && !self.ignited {
            ignite(self.callback);
            self.ignited = true;
        }

        self.is_finished()
    }

    /// Re-arm: new countdown, latch cleared.
    pub fn set_time(&mut self, duration: f32) {
        self.remaining = duration;
        self.ignited = false;
    }

    pub fn set_callback(&mut self, callback: C) {
        self.callback = callback;
    }

    pub fn callback(&self) -> C {
        self.callback
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn is_ignited(&self) -> bool {
        self.ignited
    }

    pub fn is_finished(&self) -> bool {
        self.remaining <= 0.0
    }
}
