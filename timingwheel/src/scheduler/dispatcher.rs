//! The dispatcher: pulls invocations off the trigger channel and runs each
//! on its own fire-and-forget worker thread.

use crate::invocation::DelayedInvocation;

use crossbeam_channel::Receiver;
use log::{error, trace};

use std::panic::{self, AssertUnwindSafe};
use std::thread;

/// Runs the dispatcher loop on the calling thread; never returns.
///
/// Every invocation pulled off `trigger` gets its own worker thread. The
/// dispatcher does not track or join these threads; worker concurrency is
/// unbounded, one thread per due timer.
pub(crate) fn run(trigger: Receiver<DelayedInvocation>) {
    for inv in trigger.iter() {
        thread::spawn(move || {
            let label = inv.describe();
            trace!("dispatching {}", label);
            let result = panic::catch_unwind(AssertUnwindSafe(|| inv.invoke()));
            if result.is_err() {
                error!("{} panicked during invoke()", label);
            }
        });
    }

    // `trigger.iter()` only ends once every `Sender` has been dropped,
    // which only happens when the owning `Scheduler` itself is dropped.
}
