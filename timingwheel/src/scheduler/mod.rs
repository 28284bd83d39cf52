//! The public entry point: owns the wheel hierarchy, allocates ids, and
//! runs the sampler/dispatcher threads.

mod config;
mod dispatcher;
mod sampler;

pub use config::{SchedulerConfig, WheelLevelConfig};

use crate::clock::{wall_clock_delay_ms, Now, SystemClock};
use crate::error::Error;
use crate::invocation::DelayedInvocation;
use crate::timer::Timer;
use crate::wheel::TimingWheel;

use crossbeam_channel::{bounded, Receiver};
use log::info;
use parking_lot::RwLock;

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Owns a hierarchy of [`TimingWheel`] levels and the sampler/dispatcher
/// threads that turn due timers into running callbacks.
///
/// Cloning a `Scheduler` is cheap and shares the same underlying wheels,
/// id counter, and channel — every clone is a handle to the same running
/// scheduler, not a new one.
#[derive(Clone)]
pub struct Scheduler {
    top: Arc<TimingWheel>,
    clock: Arc<dyn Now>,
    id_counter: Arc<AtomicU32>,
    live_ids: Arc<RwLock<HashSet<u32>>>,
    trigger_rx: Receiver<DelayedInvocation>,
}

impl Scheduler {
    /// Builds a scheduler using [`SchedulerConfig::default`]: the reference
    /// `{1s x 60, 60s x 60, 3600s x 12}` layout, a 2048-entry channel, and
    /// the 50ms/100ms sampler period/tolerance.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
            .expect("the default SchedulerConfig always validates")
    }

    /// Builds a scheduler from an explicit [`SchedulerConfig`], returning an
    /// error if the configuration cannot build a working wheel hierarchy.
    pub fn with_config(config: SchedulerConfig) -> Result<Self, Error> {
        config.validate()?;

        let clock: Arc<dyn Now> = Arc::new(SystemClock::new());
        Self::build(config, clock, true)
    }

    /// Test-only hook: build a scheduler against a caller-supplied clock
    /// (typically a [`SystemClock::mock`] handle) so scenario tests can
    /// control time without real sleeps.
    #[doc(hidden)]
    pub fn with_clock(config: SchedulerConfig, clock: Arc<dyn Now>) -> Result<Self, Error> {
        config.validate()?;
        Self::build(config, clock, true)
    }

    /// Test-only hook: build a scheduler without spawning the automatic
    /// dispatcher thread, leaving `trigger_channel()` otherwise untouched so
    /// a test can drive it with its own (possibly deliberately slow or
    /// paused) consumer to exercise channel backpressure.
    #[doc(hidden)]
    pub fn with_clock_no_dispatcher(
        config: SchedulerConfig,
        clock: Arc<dyn Now>,
    ) -> Result<Self, Error> {
        config.validate()?;
        Self::build(config, clock, false)
    }

    fn build(config: SchedulerConfig, clock: Arc<dyn Now>, spawn_dispatcher: bool) -> Result<Self, Error> {
        // Levels are configured coarsest-first; build finest-first so each
        // wheel can be linked to the next-finer one as soon as it exists.
        let mut levels: Vec<Arc<TimingWheel>> = config
            .levels
            .iter()
            .rev()
            .map(|level| {
                TimingWheel::new(
                    level.name.clone(),
                    level.interval_ms,
                    level.scales,
                    level.cap_hint,
                    Arc::clone(&clock),
                )
            })
            .collect();
        levels.reverse(); // back to coarsest-first

        for pair in levels.windows(2) {
            pair[0].attach_next(Arc::clone(&pair[1]));
        }

        for level in &levels {
            level.start_ticker();
        }

        let top = Arc::clone(&levels[0]);
        info!(
            "scheduler built with {} levels, leaf = {}",
            levels.len(),
            levels.last().unwrap().name()
        );

        let (trigger_tx, trigger_rx) = bounded(config.channel_capacity);
        let live_ids: Arc<RwLock<HashSet<u32>>> = Arc::new(RwLock::new(HashSet::new()));

        {
            let top = Arc::clone(&top);
            let clock = Arc::clone(&clock);
            let live_ids = Arc::clone(&live_ids);
            let period_ms = config.sample_period_ms;
            let tolerance_ms = config.sample_tolerance_ms;
            thread::Builder::new()
                .name("timingwheel-sampler".into())
                .spawn(move || {
                    sampler::run(top, clock, live_ids, trigger_tx, period_ms, tolerance_ms)
                })
                .expect("failed to spawn sampler thread");
        }

        if spawn_dispatcher {
            let rx = trigger_rx.clone();
            thread::Builder::new()
                .name("timingwheel-dispatcher".into())
                .spawn(move || dispatcher::run(rx))
                .expect("failed to spawn dispatcher thread");
        }

        Ok(Self {
            top,
            clock,
            id_counter: Arc::new(AtomicU32::new(0)),
            live_ids,
            trigger_rx,
        })
    }

    /// Schedules `inv` to run at the absolute wall-clock epoch-millisecond
    /// instant `due_epoch_ms`, converting it to the scheduler's internal
    /// monotonic domain. Never rejects for capacity reasons.
    pub fn schedule_at(&self, inv: DelayedInvocation, due_epoch_ms: u64) -> u32 {
        let delay_ms = wall_clock_delay_ms(due_epoch_ms).max(0) as u64;
        self.schedule_after(inv, Duration::from_millis(delay_ms))
    }

    /// Schedules `inv` to run `delay` from now. Never rejects for capacity
    /// reasons.
    pub fn schedule_after(&self, inv: DelayedInvocation, delay: Duration) -> u32 {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.live_ids.write().insert(id);

        let timer = Timer::after(inv, delay, self.clock.as_ref());
        if let Err(err) = self.top.add(id, timer) {
            log::error!("failed to schedule timer {}: {}", id, err);
        }
        id
    }

    /// Removes `id` from the set of ids the sampler will dispatch.
    ///
    /// This is advisory: the timer is not removed from whichever wheel
    /// slot holds it, only suppressed at the sampler's next check of
    /// `live_ids`. Idempotent.
    pub fn cancel(&self, id: u32) {
        self.live_ids.write().remove(&id);
    }

    /// Membership test against the scheduler's "should dispatch" set.
    pub fn has(&self, id: u32) -> bool {
        self.live_ids.read().contains(&id)
    }

    /// Returns a clone of the trigger channel's read end. Cheap: the
    /// channel is multi-consumer, so this may be called more than once.
    pub fn trigger_channel(&self) -> Receiver<DelayedInvocation> {
        self.trigger_rx.clone()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
