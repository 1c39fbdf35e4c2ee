// Shared helpers for the integration tests

#![allow(dead_code)]

use scopeprof::{ManualClock, PathEncoder, ProfilerContext, ScopeId};

/// Path built from `labels`, outermost first
pub fn path<const D: usize>(labels: &[&'static str]) -> PathEncoder<D> {
    let mut p = PathEncoder::new();
    for label in labels {
        p.push(ScopeId::new(label));
    }
    p
}

/// Context driven by a manual clock, plus a handle to that clock
pub fn manual_context<const D: usize>() -> (ManualClock, ProfilerContext<ManualClock, D>) {
    let clock = ManualClock::new();
    let ctx = ProfilerContext::with_clock(clock.clone());
    (clock, ctx)
}
