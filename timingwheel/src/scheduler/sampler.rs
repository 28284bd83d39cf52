//! The sampler: drains due timers from the leaf wheel into the trigger
//! channel.

use crate::clock::Now;
use crate::wheel::TimingWheel;

use crossbeam_channel::Sender;
use log::{error, trace};
use parking_lot::RwLock;

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::invocation::DelayedInvocation;

/// Runs the sampler loop on the calling thread. Call this from a spawned
/// thread; it never returns.
///
/// Every `period_ms`, drains every timer on the leaf wheel whose remaining
/// delay is under `tolerance_ms`, logs an `ERROR` for any whose observed
/// lateness exceeds `tolerance_ms`, and forwards it to `trigger` if its id
/// is still in `live_ids` — blocking if the channel is full, since no timer
/// may be dropped due to channel pressure.
pub(crate) fn run(
    top: Arc<TimingWheel>,
    clock: Arc<dyn Now>,
    live_ids: Arc<RwLock<HashSet<u32>>>,
    trigger: Sender<DelayedInvocation>,
    period_ms: u64,
    tolerance_ms: u64,
) {
    loop {
        thread::sleep(Duration::from_millis(period_ms));

        let now = clock.now_ms();
        let batch = top.drain_due(tolerance_ms);

        for (id, timer) in batch {
            let due_ms = timer.due_ms();
            let lateness = now as i64 - due_ms as i64;
            if lateness.unsigned_abs() > tolerance_ms {
                error!(
                    "timer {} dispatched late by {}ms (due {}, observed {})",
                    id, lateness, due_ms, now
                );
            }

            if live_ids.read().contains(&id) {
                let inv = timer.into_invocation();
                trace!("sampler: sending {} to trigger channel", inv.describe());
                if trigger.send(inv).is_err() {
                    // The dispatcher's receiver was dropped; nothing left
                    // to do with this invocation, and no sense retrying.
                    error!("trigger channel disconnected, dropping timer {}", id);
                }
            } else {
                trace!("sampler: timer {} was cancelled, suppressing dispatch", id);
            }
        }
    }
}
