//! Property-based checks of the two dispatch invariants that don't depend
//! on which wheel level a timer happens to live in: every scheduled timer
//! that isn't cancelled fires exactly once, and cancelled timers never
//! fire at all.

use std::collections::HashSet;
use std::sync::mpsc;
use std::time::Duration;

use quickcheck::QuickCheck;
use timingwheel::{DelayedInvocation, Scheduler};

#[path = "common/mod.rs"]
mod common;
use common::small_config;

/// `delays` drives how many timers get scheduled and how far out each one
/// is; every third one (by position) is cancelled immediately after
/// scheduling, well before its due time. The set of markers the test
/// observes fire must equal exactly the ones that were never cancelled,
/// with no repeats.
fn prop_round_trip_no_duplicates(delays: Vec<u16>) -> bool {
    if delays.is_empty() || delays.len() > 30 {
        return true;
    }

    let scheduler = match Scheduler::with_config(small_config()) {
        Ok(s) => s,
        Err(_) => return false,
    };

    let (tx, rx) = mpsc::channel();
    let mut expected = HashSet::new();

    for (i, delay) in delays.iter().enumerate() {
        let marker = i as u32;
        let tx = tx.clone();
        let inv = DelayedInvocation::new("prop", move || {
            tx.send(marker).unwrap();
        });
        let delay_ms = u64::from(*delay % 120);
        let id = scheduler.schedule_after(inv, Duration::from_millis(delay_ms));

        if i % 3 == 0 {
            scheduler.cancel(id);
        } else {
            expected.insert(marker);
        }
    }
    drop(tx);

    let mut seen = HashSet::new();
    while seen.len() < expected.len() {
        match rx.recv_timeout(Duration::from_secs(3)) {
            Ok(marker) => {
                if !seen.insert(marker) {
                    return false; // duplicate dispatch
                }
            }
            Err(_) => return false, // a non-cancelled timer never fired
        }
    }

    // Nothing cancelled should trickle in late either.
    if rx.recv_timeout(Duration::from_millis(150)).is_ok() {
        return false;
    }

    seen == expected
}

#[test]
fn round_trip_and_no_duplicate_dispatch() {
    QuickCheck::new()
        .tests(8)
        .max_tests(50)
        .quickcheck(prop_round_trip_no_duplicates as fn(Vec<u16>) -> bool);
}
