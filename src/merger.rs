//! Cross-thread delta merge
//!
//! Each thread's `StatsTable` only ever grows, so re-adding it whole on every
//! merge would count old work again. `fold` adds the current table, subtracts
//! the snapshot added last time, and stores the current table as the new
//! snapshot. The net effect is adding exactly what accrued since the previous
//! fold, while the global table stays a correct running total.
//!
//! ```text
//! fold #1   global += A            last = A
//! fold #2   global += B - A        last = B      (global holds B)
//! fold #3   global += B - B        last = B      (no change)
//! ```
//!
//! Snapshots are kept per global table, so a context that folds into several
//! tables leaves each of them holding its full total as of that table's
//! latest fold.

use crate::path_encoder::DEFAULT_MAX_DEPTH;
use crate::stats::StatsTable;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Outcome of one fold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FoldSummary {
    /// Paths added from the current table
    pub added_paths: usize,
    /// Paths retracted from the previous snapshot
    pub retracted_paths: usize,
    /// Visits gained since the previous fold into this table (negative after
    /// a reset)
    pub visit_delta: i64,
    /// First fold into this table from a context that already folded elsewhere
    pub new_target: bool,
}

/// What one context last folded into each global table
///
/// Owned by the folding context and never shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastContribution<const D: usize = DEFAULT_MAX_DEPTH> {
    snapshots: Vec<(u64, StatsTable<D>)>,
}

impl<const D: usize> LastContribution<D> {
    pub const fn new() -> Self {
        Self {
            snapshots: Vec::new(),
        }
    }

    /// Snapshot last folded into `global`, if any
    pub fn get(&self, global: &GlobalStats<D>) -> Option<&StatsTable<D>> {
        let id = global.id();
        self.snapshots
            .iter()
            .find(|(target, _)| *target == id)
            .map(|(_, table)| table)
    }

    /// Number of global tables folded into so far
    pub fn targets(&self) -> usize {
        self.snapshots.len()
    }

    /// True when no snapshot holds any entry
    pub fn is_empty(&self) -> bool {
        self.snapshots.iter().all(|(_, table)| table.is_empty())
    }

    fn slot(&mut self, id: u64) -> (&mut StatsTable<D>, bool) {
        match self.snapshots.iter().position(|(target, _)| *target == id) {
            Some(i) => (&mut self.snapshots[i].1, false),
            None => {
                let new_target = !self.snapshots.is_empty();
                self.snapshots.push((id, StatsTable::new()));
                let last = self.snapshots.len() - 1;
                (&mut self.snapshots[last].1, new_target)
            }
        }
    }
}

/// Process-wide statistics, guarded by a single lock
#[derive(Debug, Default)]
pub struct GlobalStats<const D: usize = DEFAULT_MAX_DEPTH> {
    table: Mutex<StatsTable<D>>,
    id: OnceLock<u64>,
}

impl<const D: usize> GlobalStats<D> {
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(StatsTable::new()),
            id: OnceLock::new(),
        }
    }

    /// Fold one thread's statistics into the global table
    ///
    /// `contributions` must be private to the caller. Only the snapshot kept
    /// for this table is retracted, so folding the same context into other
    /// tables in between does not disturb this one.
    pub fn fold(
        &self,
        thread_stats: &StatsTable<D>,
        contributions: &mut LastContribution<D>,
    ) -> FoldSummary {
        let (last, new_target) = contributions.slot(self.id());
        let mut global = self.lock();

        for (path, stat) in thread_stats {
            global.add(path, *stat);
        }
        for (path, stat) in &*last {
            global.subtract(path, *stat);
        }

        let summary = FoldSummary {
            added_paths: thread_stats.len(),
            retracted_paths: last.len(),
            visit_delta: thread_stats.total_visits() as i64 - last.total_visits() as i64,
            new_target,
        };
        last.clone_from(thread_stats);
        drop(global);

        if new_target {
            tracing::debug!(
                targets = contributions.targets(),
                "context folded into an additional global table"
            );
        }
        tracing::debug!(
            added = summary.added_paths,
            retracted = summary.retracted_paths,
            visit_delta = summary.visit_delta,
            "folded thread statistics"
        );

        summary
    }

    /// Copy of the current global table
    pub fn snapshot(&self) -> StatsTable<D> {
        self.lock().clone()
    }

    /// Number of distinct paths
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget all merged statistics
    ///
    /// Contexts that folded before keep their snapshots, so their next fold
    /// retracts amounts that are no longer present and saturates at zero.
    /// Clear only when no context will fold again, or reset those contexts'
    /// snapshots as well.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn id(&self) -> u64 {
        *self
            .id
            .get_or_init(|| NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed))
    }

    fn lock(&self) -> MutexGuard<'_, StatsTable<D>> {
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_encoder::PathEncoder;
    use crate::scope_id::ScopeId;
    use crate::stats::Stat;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn path(labels: &[&'static str]) -> PathEncoder<4> {
        let mut p = PathEncoder::new();
        for l in labels {
            p.push(ScopeId::new(l));
        }
        p
    }

    fn stat(micros: u64, visits: u64) -> Stat {
        Stat {
            total_duration: Duration::from_micros(micros),
            visit_count: visits,
        }
    }

    #[test]
    fn test_first_fold_adds_table() {
        let global: GlobalStats<4> = GlobalStats::new();
        let mut thread_stats = StatsTable::new();
        let mut last = LastContribution::new();
        thread_stats.add(&path(&["main"]), stat(10, 1));

        let summary = global.fold(&thread_stats, &mut last);
        assert_eq!(summary.added_paths, 1);
        assert_eq!(summary.retracted_paths, 0);
        assert_eq!(summary.visit_delta, 1);
        assert_eq!(global.snapshot(), thread_stats);
        assert_eq!(last.get(&global), Some(&thread_stats));
    }

    #[test]
    fn test_second_fold_adds_only_delta() {
        let global: GlobalStats<4> = GlobalStats::new();
        let mut thread_stats = StatsTable::new();
        let mut last = LastContribution::new();

        thread_stats.add(&path(&["main"]), stat(10, 1));
        global.fold(&thread_stats, &mut last);

        thread_stats.add(&path(&["main"]), stat(5, 1));
        thread_stats.add(&path(&["main", "io"]), stat(2, 1));
        let summary = global.fold(&thread_stats, &mut last);

        assert_eq!(summary.visit_delta, 2);
        let snapshot = global.snapshot();
        assert_eq!(snapshot.get(&path(&["main"])), Some(&stat(15, 2)));
        assert_eq!(snapshot.get(&path(&["main", "io"])), Some(&stat(2, 1)));
    }

    #[test]
    fn test_repeated_fold_is_noop() {
        let global: GlobalStats<4> = GlobalStats::new();
        let mut thread_stats = StatsTable::new();
        let mut last = LastContribution::new();
        thread_stats.add(&path(&["a"]), stat(3, 3));

        global.fold(&thread_stats, &mut last);
        let before = global.snapshot();
        let summary = global.fold(&thread_stats, &mut last);

        assert_eq!(summary.visit_delta, 0);
        assert_eq!(global.snapshot(), before);
    }

    #[test]
    fn test_fold_after_reset_retracts() {
        let global: GlobalStats<4> = GlobalStats::new();
        let mut thread_stats = StatsTable::new();
        let mut last = LastContribution::new();
        thread_stats.add(&path(&["a"]), stat(3, 3));
        global.fold(&thread_stats, &mut last);

        thread_stats.clear();
        let summary = global.fold(&thread_stats, &mut last);
        assert_eq!(summary.visit_delta, -3);
        assert!(global.is_empty());
    }

    #[test]
    fn test_threads_sum_independently() {
        let global: Arc<GlobalStats<4>> = Arc::new(GlobalStats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let global = Arc::clone(&global);
                thread::spawn(move || {
                    let mut thread_stats = StatsTable::new();
                    let mut last = LastContribution::new();
                    for _ in 0..10 {
                        thread_stats.add(&path(&["work"]), stat(1, 1));
                        global.fold(&thread_stats, &mut last);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(global.snapshot().get(&path(&["work"])), Some(&stat(40, 40)));
    }

    #[test]
    fn test_snapshots_are_kept_per_table() {
        let first: GlobalStats<4> = GlobalStats::new();
        let second: GlobalStats<4> = GlobalStats::new();
        let mut thread_stats = StatsTable::new();
        let mut last = LastContribution::new();

        thread_stats.add(&path(&["tick"]), stat(10, 1));
        let summary = first.fold(&thread_stats, &mut last);
        assert!(!summary.new_target);

        thread_stats.add(&path(&["tick"]), stat(10, 1));
        let summary = second.fold(&thread_stats, &mut last);
        assert!(summary.new_target);
        assert_eq!(summary.retracted_paths, 0);

        assert_eq!(first.snapshot().get(&path(&["tick"])), Some(&stat(10, 1)));
        assert_eq!(second.snapshot().get(&path(&["tick"])), Some(&stat(20, 2)));
        assert_eq!(last.targets(), 2);

        let summary = first.fold(&thread_stats, &mut last);
        assert!(!summary.new_target);
        assert_eq!(summary.visit_delta, 1);
        assert_eq!(first.snapshot(), second.snapshot());
    }
}
