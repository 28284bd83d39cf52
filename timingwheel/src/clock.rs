//! The source of "now" used for all due-time arithmetic.
//!
//! The wheels and the sampler never call [`Instant::now`] or
//! [`SystemTime::now`] directly; they go through a [`Now`] implementation so
//! that tests can swap in a clock they control. [`SystemClock`] is the
//! default and is backed by a monotonic [`quanta::Clock`], not the wall
//! clock.
//!
//! [`Instant::now`]: std::time::Instant::now
//! [`SystemTime::now`]: std::time::SystemTime::now

use quanta::{Clock, Mock};

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of monotonic milliseconds.
///
/// Implementors only need to provide a strictly non-decreasing
/// `now_ms`; the absolute value has no meaning outside of subtracting two
/// readings from the same clock instance.
pub trait Now: Send + Sync + 'static {
    /// Returns the current reading of this clock, in milliseconds.
    fn now_ms(&self) -> u64;
}

/// The default, monotonic, wall-clock-independent [`Now`] implementation.
#[derive(Clone)]
pub struct SystemClock {
    inner: Clock,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            inner: Clock::new(),
        }
    }

    /// Builds a clock paired with a [`Mock`] handle that lets tests advance
    /// it deterministically, bypassing real sleeps.
    pub fn mock() -> (Self, Arc<Mock>) {
        let (inner, mock) = Clock::mock();
        (Self { inner }, mock)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Now for SystemClock {
    fn now_ms(&self) -> u64 {
        self.inner.now() / 1_000_000
    }
}

/// Converts a wall-clock epoch-millisecond due time into a delay relative to
/// "now", expressed against the wall clock rather than any [`Now`]
/// implementation.
///
/// This is used only at the public API boundary (`schedule_at`) to bridge
/// the wall-clock due time a caller supplies into the monotonic domain the
/// wheels operate in; it is never used for ticking or cascading.
pub(crate) fn wall_clock_delay_ms(due_epoch_ms: u64) -> i64 {
    let now_epoch_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    due_epoch_ms as i64 - now_epoch_ms as i64
}
