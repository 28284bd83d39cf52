//! One level of the hierarchical timing wheel.
//!
//! A [`TimingWheel`] is a fixed-size circular array of slots, each holding an
//! id-keyed map of [`Timer`]s. A background ticker thread advances the
//! wheel's cursor by one slot every `interval_ms` and rehomes whatever was
//! in the slot it just vacated. Levels are linked coarsest-to-finest through
//! [`attach_next`](TimingWheel::attach_next); the wheel with no `next` is
//! the leaf, and is the only level the scheduler ever drains from.

mod slot;

use slot::{new_slot, WheelState};

use crate::clock::Now;
use crate::error::Error;
use crate::timer::Timer;

use log::{debug, error, info, trace};
use parking_lot::Mutex;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub use slot::SlotMap;

/// One level of the hierarchical wheel.
pub struct TimingWheel {
    name: String,
    interval_ms: u64,
    scales: usize,
    cap_hint: usize,
    clock: Arc<dyn Now>,
    state: Mutex<WheelState>,
    next: Mutex<Option<Arc<TimingWheel>>>,
}

impl TimingWheel {
    /// Builds a new, unlinked wheel level. Call [`attach_next`] before
    /// starting its ticker if this is not meant to be the leaf.
    ///
    /// [`attach_next`]: TimingWheel::attach_next
    pub fn new(
        name: impl Into<String>,
        interval_ms: u64,
        scales: usize,
        cap_hint: usize,
        clock: Arc<dyn Now>,
    ) -> Arc<Self> {
        assert!(scales > 0, "a wheel level must have at least one slot");
        assert!(interval_ms > 0, "a wheel level must have a non-zero interval");

        Arc::new(Self {
            name: name.into(),
            interval_ms,
            scales,
            cap_hint,
            clock,
            state: Mutex::new(WheelState::new(scales, cap_hint)),
            next: Mutex::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn scales(&self) -> usize {
        self.scales
    }

    /// Links this level to the finer-grained wheel below it.
    ///
    /// Called once at construction time, before any ticker thread is
    /// started. Not synchronized against concurrent `add`/`tick` calls by
    /// design: wiring the hierarchy is not a steady-state operation. A
    /// second call silently overwrites the first, matching the reference
    /// implementation's behavior.
    pub fn attach_next(&self, child: Arc<TimingWheel>) {
        *self.next.lock() = Some(child);
    }

    /// Spawns this level's ticker thread.
    pub fn start_ticker(self: &Arc<Self>) {
        let this = Arc::clone(self);
        thread::Builder::new()
            .name(format!("timingwheel-{}-ticker", this.name))
            .spawn(move || {
                info!("ticker started for level {}", this.name);
                loop {
                    this.tick();
                }
            })
            .expect("failed to spawn wheel ticker thread");
    }

    /// Places `id`/`timer` into the appropriate slot of this level, or
    /// cascades down to `next` if `timer` is due sooner than this level's
    /// resolution can usefully place it.
    pub fn add(&self, id: u32, timer: Timer) -> Result<(), Error> {
        self.add_internal(id, timer, false)
    }

    fn add_internal(&self, id: u32, timer: Timer, forced: bool) -> Result<(), Error> {
        let now = self.clock.now_ms();
        let remaining = timer.due_ms() as i64 - now as i64;
        let interval = self.interval_ms as i64;

        if remaining >= interval {
            let steps = (remaining / interval) as usize;
            let mut state = self.state.lock();
            let idx = (state.cursor + steps) % self.scales;
            trace!(
                "{}: placing timer {} at slot {} ({}ms remaining)",
                self.name,
                id,
                idx,
                remaining
            );
            self.insert_into(&mut state, idx, id, timer)
        } else {
            let next = self.next.lock().clone();
            match next {
                // `forced` only ever applies to the level whose own `tick()`
                // called `add_internal` on itself; once a timer crosses a
                // level boundary it resets to an ordinary (unforced) add.
                Some(next) => next.add_internal(id, timer, false),
                None => {
                    let mut state = self.state.lock();
                    let idx = if forced {
                        (state.cursor + 1) % self.scales
                    } else {
                        state.cursor
                    };
                    trace!(
                        "{}: leaf-placing timer {} at slot {} (forced={})",
                        self.name,
                        id,
                        idx,
                        forced
                    );
                    self.insert_into(&mut state, idx, id, timer)
                }
            }
        }
    }

    fn insert_into(
        &self,
        state: &mut WheelState,
        idx: usize,
        id: u32,
        timer: Timer,
    ) -> Result<(), Error> {
        if state.slots[idx].len() >= self.cap_hint {
            debug!(
                "{}: slot {} holds {} timers, past its {} cap hint",
                self.name,
                idx,
                state.slots[idx].len(),
                self.cap_hint
            );
        }
        state.slots[idx].insert(id, timer);
        Ok(())
    }

    /// Removes `id` from this level's slots only; does not descend into
    /// `next`. A timer already demoted past this level will not be found
    /// here, which is why a scheduler-level cancel is advisory.
    pub fn remove(&self, id: u32) -> Option<Timer> {
        let mut state = self.state.lock();
        for slot in state.slots.iter_mut() {
            if let Some(timer) = slot.remove(&id) {
                return Some(timer);
            }
        }
        None
    }

    /// Advances the cursor by one slot, after sleeping one `interval_ms`.
    ///
    /// Rehomes everything in the slot being vacated (forced so that leaf
    /// timers become visible to the sampler rather than stranded) and also
    /// re-evaluates the slot the cursor is about to land on.
    pub fn tick(&self) {
        thread::sleep(Duration::from_millis(self.interval_ms));

        // Detach both slots while `cursor` still holds its pre-tick value:
        // forced leaf placement below is relative to that old value, so the
        // cursor bump must happen only after every rehomed entry has been
        // re-added. The lock isn't held across the re-add loop; `add_internal`
        // takes it again itself.
        let (cursor, upcoming, detached) = {
            let mut state = self.state.lock();
            let cursor = state.cursor;
            let upcoming = (cursor + 1) % self.scales;
            let mut detached = std::mem::replace(&mut state.slots[cursor], new_slot(self.cap_hint));
            detached.extend(std::mem::replace(
                &mut state.slots[upcoming],
                new_slot(self.cap_hint),
            ));
            (cursor, upcoming, detached)
        };

        for (id, timer) in detached {
            if let Err(err) = self.add_internal(id, timer, true) {
                error!("{}: failed to rehome timer {}: {}", self.name, id, err);
            }
        }

        self.state.lock().cursor = upcoming;
        trace!(
            "{}: tick complete, cursor {} -> {}",
            self.name,
            cursor,
            upcoming
        );
    }

    /// Walks down to the leaf level and removes every timer in its current
    /// slot whose remaining delay is under `window_ms`.
    pub fn drain_due(&self, window_ms: u64) -> SlotMap {
        let next = self.next.lock().clone();
        if let Some(next) = next {
            return next.drain_due(window_ms);
        }

        let now = self.clock.now_ms();
        let mut state = self.state.lock();
        let cursor = state.cursor;
        let slot = &mut state.slots[cursor];

        let due_ids: Vec<u32> = slot
            .iter()
            .filter(|(_, timer)| {
                let remaining = timer.due_ms() as i64 - now as i64;
                remaining < window_ms as i64
            })
            .map(|(id, _)| *id)
            .collect();

        let mut due = new_slot(due_ids.len());
        for id in due_ids {
            if let Some(timer) = slot.remove(&id) {
                due.insert(id, timer);
            }
        }
        due
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::SystemClock;
    use crate::invocation::DelayedInvocation;

    fn wheel(interval_ms: u64, scales: usize) -> Arc<TimingWheel> {
        TimingWheel::new("TEST", interval_ms, scales, 16, Arc::new(SystemClock::new()))
    }

    #[test]
    fn test_add_places_far_timer_in_this_level() {
        let w = wheel(1_000, 60);
        let now = w.clock.now_ms();
        let inv = DelayedInvocation::new("x", || {});
        w.add(1, Timer::at(inv, now + 5_000)).unwrap();

        let state = w.state.lock();
        let total: usize = state.slots.iter().map(|s| s.len()).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_add_cascades_to_next_when_too_soon() {
        let leaf = wheel(1_000, 60);
        let top = wheel(60_000, 60);
        top.attach_next(Arc::clone(&leaf));

        let now = top.clock.now_ms();
        let inv = DelayedInvocation::new("x", || {});
        top.add(1, Timer::at(inv, now + 500)).unwrap();

        let top_count: usize =
            top.state.lock().slots.iter().map(|s| s.len()).sum();
        let leaf_count: usize =
            leaf.state.lock().slots.iter().map(|s| s.len()).sum();
        assert_eq!(top_count, 0);
        assert_eq!(leaf_count, 1);
    }

    #[test]
    fn test_remove_only_scans_this_level() {
        let leaf = wheel(1_000, 60);
        let top = wheel(60_000, 60);
        top.attach_next(Arc::clone(&leaf));

        let now = top.clock.now_ms();
        let inv = DelayedInvocation::new("x", || {});
        top.add(1, Timer::at(inv, now + 500)).unwrap();

        // The timer cascaded into `leaf`, so `top.remove` must not find it.
        assert!(top.remove(1).is_none());
        assert!(leaf.remove(1).is_some());
    }

    #[test]
    fn test_drain_due_walks_to_leaf() {
        let leaf = wheel(1_000, 60);
        let top = wheel(60_000, 60);
        top.attach_next(Arc::clone(&leaf));

        let now = top.clock.now_ms();
        let inv = DelayedInvocation::new("x", || {});
        top.add(1, Timer::at(inv, now + 10)).unwrap();

        let due = top.drain_due(100);
        assert!(due.contains_key(&1));
    }

    // A timer placed anywhere in the hierarchy lives in exactly one slot of
    // exactly one level; cascading never duplicates and never drops it.
    #[test]
    fn prop_each_timer_occupies_exactly_one_slot() {
        fn prop(delays: Vec<u16>) -> bool {
            if delays.is_empty() || delays.len() > 50 {
                return true;
            }

            let leaf = wheel(8, 5);
            let mid = wheel(40, 5);
            let top = wheel(200, 12);
            top.attach_next(Arc::clone(&mid));
            mid.attach_next(Arc::clone(&leaf));

            let now = top.clock.now_ms();
            for (i, d) in delays.iter().enumerate() {
                let id = i as u32 + 1;
                let inv = DelayedInvocation::new("p", || {});
                let due = now + (u64::from(*d) % 20_000);
                if top.add(id, Timer::at(inv, due)).is_err() {
                    return false;
                }
            }

            let occurrences = |id: u32| -> usize {
                [&top, &mid, &leaf]
                    .iter()
                    .map(|w| {
                        w.state
                            .lock()
                            .slots
                            .iter()
                            .filter(|s| s.contains_key(&id))
                            .count()
                    })
                    .sum()
            };

            (1..=delays.len() as u32).all(|id| occurrences(id) == 1)
        }

        quickcheck::QuickCheck::new()
            .tests(20)
            .quickcheck(prop as fn(Vec<u16>) -> bool);
    }
}
