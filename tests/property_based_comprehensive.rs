//! Property-based tests for the profiler core
//!
//! Core properties covered:
//! 1. Path depth accounting under arbitrary push/pop
//! 2. Stat arithmetic
//! 3. Well-nested scope sequences aggregate every frame exactly once
//! 4. Folding any sequence of snapshots leaves exactly the last one

mod utils;

use proptest::prelude::*;
use scopeprof::{GlobalStats, LastContribution, PathEncoder, ScopeId, Stat, StatsTable};
use std::time::Duration;
use utils::manual_context;

const LABELS: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

/// A well-nested tree of scopes: each node is a label index, a self time in
/// nanoseconds and its children
#[derive(Debug, Clone)]
struct Frame {
    label: usize,
    self_ns: u64,
    children: Vec<Frame>,
}

fn frame_strategy() -> impl Strategy<Value = Frame> {
    let leaf = (0..LABELS.len(), 0u64..50).prop_map(|(label, self_ns)| Frame {
        label,
        self_ns,
        children: Vec::new(),
    });
    leaf.prop_recursive(6, 48, 4, |inner| {
        (0..LABELS.len(), 0u64..50, prop::collection::vec(inner, 0..4)).prop_map(
            |(label, self_ns, children)| Frame {
                label,
                self_ns,
                children,
            },
        )
    })
}

fn frame_count(frame: &Frame) -> u64 {
    1 + frame.children.iter().map(frame_count).sum::<u64>()
}

fn frame_total_ns(frame: &Frame) -> u64 {
    frame.self_ns + frame.children.iter().map(frame_total_ns).sum::<u64>()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_capacity_is_min_of_size_and_depth(ops in prop::collection::vec(any::<bool>(), 0..64)) {
        // Property: capacity == min(size, D) after any push/pop sequence
        let mut path: PathEncoder<5> = PathEncoder::new();
        let mut expected_size = 0usize;
        for push in ops {
            if push {
                path.push(ScopeId::new("x"));
                expected_size += 1;
            } else {
                path.pop();
                expected_size = expected_size.saturating_sub(1);
            }
            prop_assert_eq!(path.size(), expected_size);
            prop_assert_eq!(path.capacity(), expected_size.min(5));
            prop_assert_eq!(path.truncated(), expected_size.saturating_sub(5));
        }
    }

    #[test]
    fn prop_push_then_pop_restores_path(
        prefix in prop::collection::vec(0..LABELS.len(), 0..8),
        extra in prop::collection::vec(0..LABELS.len(), 0..8),
    ) {
        // Property: pushing then popping the same number of labels is the identity
        let mut path: PathEncoder<4> = PathEncoder::new();
        for i in prefix {
            path.push(ScopeId::new(LABELS[i]));
        }
        let before = path;
        for &i in &extra {
            path.push(ScopeId::new(LABELS[i]));
        }
        for _ in &extra {
            path.pop();
        }
        prop_assert_eq!(path, before);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_stat_add_sub_inverse(
        a_ns in 0u64..1_000_000_000,
        a_visits in 0u64..1_000_000,
        b_ns in 0u64..1_000_000_000,
        b_visits in 0u64..1_000_000,
    ) {
        let a = Stat { total_duration: Duration::from_nanos(a_ns), visit_count: a_visits };
        let b = Stat { total_duration: Duration::from_nanos(b_ns), visit_count: b_visits };
        prop_assert_eq!((a + b) - b, a);
        prop_assert_eq!((a + b) - a, b);
        prop_assert_eq!(a + Stat::ZERO, a);
    }

    #[test]
    fn prop_stat_sub_saturates(
        a_ns in 0u64..1_000,
        b_ns in 1_000u64..2_000,
    ) {
        let a = Stat { total_duration: Duration::from_nanos(a_ns), visit_count: 1 };
        let b = Stat { total_duration: Duration::from_nanos(b_ns), visit_count: 2 };
        prop_assert!((a - b).is_zero());
    }
}

fn run_frame<const D: usize>(
    frame: &Frame,
    ctx: &mut scopeprof::ProfilerContext<scopeprof::ManualClock, D>,
    clock: &scopeprof::ManualClock,
) {
    ctx.begin_scope(LABELS[frame.label]);
    clock.advance(Duration::from_nanos(frame.self_ns));
    for child in &frame.children {
        run_frame(child, ctx, clock);
    }
    ctx.end_scope();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_well_nested_accounting(frames in prop::collection::vec(frame_strategy(), 1..4)) {
        // Property: every frame is counted once and root totals add up,
        // even when paths overflow the stored depth
        let (clock, mut ctx) = manual_context::<3>();
        for frame in &frames {
            run_frame(frame, &mut ctx, &clock);
        }
        let summary = ctx.reduce();

        let expected_visits: u64 = frames.iter().map(frame_count).sum();
        prop_assert_eq!(summary.aggregated as u64, expected_visits);
        prop_assert_eq!(summary.retained, 0);
        prop_assert_eq!(ctx.stats().total_visits(), expected_visits);
        prop_assert!(ctx.path().is_empty());

        let root_ns: u64 = ctx
            .stats()
            .iter()
            .filter(|(path, _)| path.size() == 1)
            .map(|(_, stat)| stat.total_duration.as_nanos() as u64)
            .sum();
        let expected_ns: u64 = frames.iter().map(frame_total_ns).sum();
        prop_assert_eq!(root_ns, expected_ns);

        // A second reduce never changes anything
        let before = ctx.stats().clone();
        ctx.reduce();
        prop_assert_eq!(ctx.stats(), &before);
    }

    #[test]
    fn prop_fold_leaves_last_snapshot(
        snapshots in prop::collection::vec(
            prop::collection::vec((0..LABELS.len(), 1u64..100, 1u64..10), 0..6),
            1..6,
        )
    ) {
        // Property: folding snapshots S1..Sn leaves the global table equal to Sn
        let global: GlobalStats<4> = GlobalStats::new();
        let mut last = LastContribution::new();
        let mut expected = StatsTable::new();

        for rows in &snapshots {
            let mut table: StatsTable<4> = StatsTable::new();
            for &(label, ns, visits) in rows {
                let mut path = PathEncoder::new();
                path.push(ScopeId::new(LABELS[label]));
                table.add(&path, Stat { total_duration: Duration::from_nanos(ns), visit_count: visits });
            }
            global.fold(&table, &mut last);
            expected = table;
        }

        prop_assert_eq!(global.snapshot(), expected);
    }
}
