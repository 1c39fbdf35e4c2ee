//! Explicit per-worker profiling context
//!
//! A `ProfilerContext` bundles everything one execution context owns: the
//! current path, the raw event log, the aggregated table, the snapshot of its
//! last global contribution, and a clock. Nothing in it is shared, so Begin,
//! End and `reduce` never synchronize. Only `fold` touches the global table.
//!
//! Scopes are usually opened through [`ProfilerContext::scope`], which returns
//! a guard that closes the scope when dropped. The guard dereferences to the
//! context, so nested scopes are opened through the outer guard and the
//! borrow checker rules out closing them out of order:
//!
//! ```
//! use scopeprof::ProfilerContext;
//!
//! let mut ctx = ProfilerContext::new();
//! {
//!     let mut outer = ctx.scope("load");
//!     let _inner = outer.scope("parse");
//! }
//! ctx.reduce();
//! assert_eq!(ctx.stats().len(), 2);
//! ```

use crate::aggregator::{self, ReduceSummary};
use crate::clock::{Clock, MonotonicClock};
use crate::config::ProfilerConfig;
use crate::event_log::ScopeEventLog;
use crate::merger::{FoldSummary, GlobalStats, LastContribution};
use crate::path_encoder::{PathEncoder, DEFAULT_MAX_DEPTH};
use crate::scope_id::ScopeId;
use crate::stats::StatsTable;
use std::ops::{Deref, DerefMut};

/// Per-worker profiler state
#[derive(Debug)]
pub struct ProfilerContext<C: Clock = MonotonicClock, const D: usize = DEFAULT_MAX_DEPTH> {
    clock: C,
    log: ScopeEventLog<D>,
    stats: StatsTable<D>,
    last_contribution: LastContribution<D>,
}

impl ProfilerContext {
    /// Context with the wall clock and default depth
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }

    /// Context with the wall clock, sized from `config`
    pub fn from_config(config: &ProfilerConfig) -> Self {
        Self::with_clock_and_config(MonotonicClock::new(), config)
    }
}

impl Default for ProfilerContext {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock, const D: usize> ProfilerContext<C, D> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            log: ScopeEventLog::new(),
            stats: StatsTable::new(),
            last_contribution: LastContribution::new(),
        }
    }

    pub fn with_clock_and_config(clock: C, config: &ProfilerConfig) -> Self {
        Self {
            clock,
            log: ScopeEventLog::with_capacity(config.event_log_capacity),
            stats: StatsTable::new(),
            last_contribution: LastContribution::new(),
        }
    }

    /// Open a scope
    ///
    /// Must be matched by exactly one [`end_scope`](Self::end_scope) on this
    /// context, in LIFO order. Prefer [`scope`](Self::scope).
    #[inline]
    pub fn begin_scope(&mut self, id: impl Into<ScopeId>) {
        let clock = &self.clock;
        self.log.begin_with(id.into(), || clock.now());
    }

    /// Close the innermost open scope
    #[inline]
    pub fn end_scope(&mut self) {
        // Read the clock before the backward scan so the scan is not billed.
        let now = self.clock.now();
        self.log.end(now);
    }

    /// Open a scope that closes when the returned guard drops
    pub fn scope(&mut self, id: impl Into<ScopeId>) -> ScopeGuard<'_, C, D> {
        self.begin_scope(id);
        ScopeGuard { ctx: self }
    }

    /// Run `f` inside a scope named `id`
    pub fn measure<F, R>(&mut self, id: impl Into<ScopeId>, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        let mut guard = self.scope(id);
        f(&mut guard)
    }

    /// Move closed events into this context's table
    pub fn reduce(&mut self) -> ReduceSummary {
        aggregator::reduce(&mut self.log, &mut self.stats)
    }

    /// Publish everything gathered since the last fold into `global`
    ///
    /// Only aggregated statistics are published; call [`reduce`](Self::reduce)
    /// first to include recently closed scopes. A snapshot is kept per global
    /// table, so folding into a second table publishes the full total there
    /// without disturbing the first.
    pub fn fold(&mut self, global: &GlobalStats<D>) -> FoldSummary {
        global.fold(&self.stats, &mut self.last_contribution)
    }

    /// Forget local events and statistics
    ///
    /// The last global contribution is kept, so the next fold retracts what
    /// this context published before.
    pub fn reset(&mut self) {
        self.log.clear();
        self.stats.clear();
    }

    /// Current call path
    pub fn path(&self) -> &PathEncoder<D> {
        self.log.path()
    }

    pub fn event_log(&self) -> &ScopeEventLog<D> {
        &self.log
    }

    pub fn stats(&self) -> &StatsTable<D> {
        &self.stats
    }

    /// What this context added to each global table on its last fold there
    pub fn last_contribution(&self) -> &LastContribution<D> {
        &self.last_contribution
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// Open scope on a [`ProfilerContext`], closed on drop
///
/// Dropping runs on every exit path of the enclosing block, including early
/// returns, `?` and unwinding.
#[must_use = "dropping the guard immediately closes the scope; bind it with `let _guard = ...`"]
pub struct ScopeGuard<'a, C: Clock = MonotonicClock, const D: usize = DEFAULT_MAX_DEPTH> {
    ctx: &'a mut ProfilerContext<C, D>,
}

impl<C: Clock, const D: usize> Deref for ScopeGuard<'_, C, D> {
    type Target = ProfilerContext<C, D>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl<C: Clock, const D: usize> DerefMut for ScopeGuard<'_, C, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl<C: Clock, const D: usize> Drop for ScopeGuard<'_, C, D> {
    fn drop(&mut self) {
        self.ctx.end_scope();
    }
}
