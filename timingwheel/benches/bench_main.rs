use criterion::{criterion_group, criterion_main, Criterion};

use std::time::Duration;
use timingwheel::{DelayedInvocation, Scheduler};

fn bench_schedule_after(c: &mut Criterion) {
    let scheduler = Scheduler::new();

    c.bench_function("schedule_after 12h-wide spread", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let inv = DelayedInvocation::new("bench", || {});
            // Spread delays across the whole representable range so the
            // benchmark exercises insertion at every wheel level, not just
            // the leaf.
            let delay_ms = i % (12 * 60 * 60 * 1000);
            i += 1;
            scheduler.schedule_after(inv, Duration::from_millis(delay_ms));
        })
    });
}

criterion_group!(benches, bench_schedule_after);
criterion_main!(benches);
