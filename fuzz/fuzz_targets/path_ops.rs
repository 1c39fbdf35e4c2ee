#![no_main]

use libfuzzer_sys::fuzz_target;
use scopeprof::{GlobalStats, ManualClock, ProfilerContext, ScopeId, StatsTable};
use std::time::Duration;

const LABELS: [&str; 4] = ["a", "b", "c", "d"];

fuzz_target!(|data: &[u8]| {
    // Each byte is one operation on a small-depth context. Unmatched ends and
    // paths deeper than the bound must never panic.
    let clock = ManualClock::new();
    let mut ctx: ProfilerContext<ManualClock, 3> = ProfilerContext::with_clock(clock.clone());
    let global: GlobalStats<3> = GlobalStats::new();
    let mut depth = 0usize;

    for &byte in data {
        match byte % 5 {
            0 | 1 => {
                ctx.begin_scope(ScopeId::new(LABELS[usize::from(byte >> 3) % LABELS.len()]));
                depth += 1;
            }
            2 => {
                ctx.end_scope();
                depth = depth.saturating_sub(1);
            }
            3 => {
                ctx.reduce();
            }
            _ => {
                ctx.fold(&global);
            }
        }
        clock.advance(Duration::from_nanos(u64::from(byte)));

        assert_eq!(ctx.path().size(), depth);
        assert_eq!(ctx.path().capacity(), depth.min(3));
    }

    // Closing everything and folding publishes exactly the local table
    for _ in 0..depth {
        ctx.end_scope();
    }
    ctx.reduce();
    ctx.fold(&global);
    assert_eq!(ctx.event_log().open_count(), 0);
    let local: StatsTable<3> = ctx.stats().clone();
    assert_eq!(global.snapshot(), local);
});
