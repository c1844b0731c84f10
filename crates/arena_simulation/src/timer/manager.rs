//! Registry of live timers for one simulation session.
//!
//! Owners keep a [`TimerId`]; the manager keeps the countdown. Finished
//! timers are *not* dropped automatically: owners must `unregister` them.

use std::collections::BTreeMap;

use crate::timer::Timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct TimerManager<C> {
    /// BTreeMap: порядок обхода стабилен между прогонами
    timers: BTreeMap<TimerId, Timer<C>>,
    next_id: u64,
}

impl<C> Default for TimerManager<C> {
    fn default() -> Self {
        Self {
            timers: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<C: Copy> TimerManager<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a timer. Counting starts with the next `advance`.
    pub fn start(&mut self, duration: f32, callback: C) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(id, Timer::new(duration, callback));
        id
    }

    /// Re-arm a registered timer. `false` if `id` is not registered.
    pub fn set_time(&mut self, id: TimerId, duration: f32) -> bool {
        match self.timers.get_mut(&id) {
            Some(timer) => {
                timer.set_time(duration);
                true
            }
            None => false,
        }
    }

    /// Re-arm the timer in `slot` if it is still registered, otherwise start
    /// a fresh one and store its id in `slot`.
    pub fn rearm_or_start(&mut self, slot: &mut Option<TimerId>, duration: f32, callback: C) -> TimerId {
        if let Some(id) = *slot {
            if let Some(timer) = self.timers.get_mut(&id) {
                timer.set_time(duration);
                timer.set_callback(callback);
                return id;
            }
        }

        let id = self.start(duration, callback);
        *slot = Some(id);
        id
    }

    /// Remove a timer. Safe to call for ids that are already gone.
    pub fn unregister(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Remove every timer whose callback matches.
    pub fn unregister_where(&mut self, mut predicate: impl FnMut(&C) -> bool) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, timer| !predicate(&timer.callback()));
        before - self.timers.len()
    }

    pub fn is_registered(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    /// Registered *and* still latched: an ignition collected this tick has
    /// not been cancelled or re-armed since.
    pub fn has_fired(&self, id: TimerId) -> bool {
        self.timers.get(&id).is_some_and(|timer| timer.is_ignited())
    }

    pub fn get(&self, id: TimerId) -> Option<&Timer<C>> {
        self.timers.get(&id)
    }

    pub fn remaining(&self, id: TimerId) -> Option<f32> {
        self.timers.get(&id).map(|timer| timer.remaining())
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advance every registered timer once.
    ///
    /// Returns the ignitions of this tick. Dispatch them *after* this call;
    /// skip any whose `has_fired` turned false in the meantime.
    pub fn advance(&mut self, delta: f32) -> Vec<(TimerId, C)> {
        let mut fired = Vec::new();
        for (id, timer) in self.timers.iter_mut() {
            timer.advance(delta, |callback| fired.push((*id, callback)));
        }
        fired
    }

    /// Session teardown.
    pub fn clear(&mut self) {
        self.timers.clear();
    }
}
