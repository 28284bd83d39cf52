//! A [`DelayedInvocation`] paired with its due time.

use crate::clock::Now;
use crate::invocation::DelayedInvocation;

use std::time::Duration;

/// An invocation bound to an absolute due time, expressed in the
/// monotonic-clock millisecond domain used throughout the wheels.
///
/// A `Timer` is immutable once built. It moves between wheel slots by
/// value; it is not `Clone`, since exactly one slot owns it at a time.
#[derive(Debug)]
pub struct Timer {
    due_ms: u64,
    inv: DelayedInvocation,
}

impl Timer {
    /// Builds a `Timer` due at the given absolute millisecond reading of
    /// whatever clock the caller's wheel hierarchy uses.
    pub fn at(inv: DelayedInvocation, due_ms: u64) -> Self {
        Self { due_ms, inv }
    }

    /// Builds a `Timer` due `delay` from now, as read from `clock`.
    pub fn after(inv: DelayedInvocation, delay: Duration, clock: &dyn Now) -> Self {
        let due_ms = clock.now_ms() + delay.as_millis() as u64;
        Self::at(inv, due_ms)
    }

    /// The absolute due time, in the monotonic millisecond domain.
    pub fn due_ms(&self) -> u64 {
        self.due_ms
    }

    /// Consumes the timer, yielding its invocation.
    pub fn into_invocation(self) -> DelayedInvocation {
        self.inv
    }

    /// Spawns a standalone thread that sleeps until this timer is due and
    /// then invokes it directly, bypassing any wheel.
    ///
    /// This is not used by [`Scheduler`](crate::Scheduler) — every timer it
    /// tracks goes through a wheel — but is kept as a minor, low-cost
    /// convenience for callers who just want a single one-off delayed call
    /// without standing up a whole scheduler.
    pub fn run_standalone(self, clock: &dyn Now) {
        let remaining = self.due_ms.saturating_sub(clock.now_ms());
        std::thread::sleep(Duration::from_millis(remaining));
        self.inv.invoke();
    }
}
