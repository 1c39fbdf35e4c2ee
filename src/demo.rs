//! Synthetic workload for the `scopeprof` binary
//!
//! Three mutually calling functions with nested named loops, enough to give
//! the report a few levels of call path and a repeated leaf (`big_wave`) under
//! different parents.

use crate::stats::StatsTable;
use crate::thread_profiler;
use crate::{profile_function, profile_scope};
use std::hint::black_box;
use std::thread;

/// Sine accumulation
pub fn big_wave() -> f64 {
    profile_function!();

    let mut ret = 0.0;
    for i in 0..10_000 {
        ret += (f64::from(i / 1_000)).sin() - ret * 0.9;
    }
    black_box(ret)
}

/// Repeated exponentiation in three labelled loops
pub fn huge_power() -> f64 {
    profile_function!();

    let mut ret: f64 = 2.0;
    {
        profile_scope!("first_power_loop");
        for i in 0..5_000 {
            let exp = f64::from(i % 10 + 1) / 7.8;
            ret = (ret * 1.4).powf(exp);
        }
    }
    {
        profile_scope!("second_power_loop");
        for i in 0..5_000 {
            let exp = f64::from(((i & 8) + 1) >> 3);
            ret = (ret * 1.4).powf(exp);
        }
    }
    {
        profile_scope!("big_wave_power_loop");
        for _ in 0..3 {
            ret -= big_wave();
        }
    }
    black_box(ret)
}

/// Outer driver: `iterations` rounds of [`big_wave`] and [`huge_power`]
pub fn heavy_calc(iterations: usize) -> f64 {
    profile_function!();

    let mut ret = 0.0;
    for _ in 0..iterations {
        ret += big_wave();
        ret -= huge_power();
    }
    ret
}

/// Run the workload on the calling thread and reduce
///
/// Returns the workload's result and a copy of this thread's statistics,
/// which accumulate across calls.
pub fn profile_local_run(iterations: usize) -> (f64, StatsTable) {
    let lucky = heavy_calc(iterations);
    let summary = thread_profiler::reduce();
    tracing::info!(
        aggregated = summary.aggregated,
        retained = summary.retained,
        "local run reduced"
    );
    (lucky, thread_profiler::thread_stats())
}

/// Fold the calling thread, then run the workload on `threads` workers that
/// each reduce and fold
///
/// Returns a snapshot of the process-wide table once every worker finished.
pub fn profile_workers(iterations: usize, threads: usize) -> StatsTable {
    thread_profiler::fold();

    thread::scope(|s| {
        for worker in 0..threads {
            s.spawn(move || {
                heavy_calc(iterations);
                thread_profiler::reduce();
                let summary = thread_profiler::fold();
                tracing::info!(
                    worker,
                    added = summary.added_paths,
                    visits = summary.visit_delta,
                    "worker folded"
                );
            });
        }
    });

    thread_profiler::global_snapshot()
}
