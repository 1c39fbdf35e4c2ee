//! Thread-attached profiling
//!
//! Convenience layer over [`ProfilerContext`] for code that does not want to
//! pass a context around: each OS thread lazily gets its own context, and
//! all threads fold into one process-wide [`GlobalStats`].
//!
//! ```
//! use scopeprof::{profile_function, profile_scope, thread_profiler};
//!
//! fn checksum(data: &[u8]) -> u32 {
//!     profile_function!();
//!     let mut sum = 0u32;
//!     {
//!         profile_scope!("fold_bytes");
//!         for b in data {
//!             sum = sum.wrapping_mul(31).wrapping_add(u32::from(*b));
//!         }
//!     }
//!     sum
//! }
//!
//! checksum(b"hello");
//! thread_profiler::reduce();
//! thread_profiler::fold();
//! # #[cfg(not(feature = "disabled"))]
//! assert_eq!(thread_profiler::thread_stats().len(), 2);
//! ```
//!
//! The per-thread context sits in a `RefCell`. Opening or closing scopes from
//! inside [`with_context`] panics on the double borrow.

use crate::aggregator::ReduceSummary;
use crate::context::ProfilerContext;
use crate::merger::{FoldSummary, GlobalStats};
use crate::scope_id::ScopeId;
use crate::stats::StatsTable;
use std::cell::RefCell;
use std::marker::PhantomData;

static GLOBAL: GlobalStats = GlobalStats::new();

thread_local! {
    static CONTEXT: RefCell<ProfilerContext> = RefCell::new(ProfilerContext::new());
}

/// Open a scope on this thread's context
///
/// Does nothing while the thread's storage is being torn down.
#[inline]
pub fn begin_scope(id: impl Into<ScopeId>) {
    let id = id.into();
    let _ = CONTEXT.try_with(|ctx| ctx.borrow_mut().begin_scope(id));
}

/// Close the innermost scope on this thread's context
#[inline]
pub fn end_scope() {
    let _ = CONTEXT.try_with(|ctx| ctx.borrow_mut().end_scope());
}

/// Open a scope that closes when the guard drops
pub fn scope(id: impl Into<ScopeId>) -> ThreadScopeGuard {
    begin_scope(id);
    ThreadScopeGuard {
        _not_send: PhantomData,
    }
}

/// Reduce this thread's closed events
pub fn reduce() -> ReduceSummary {
    CONTEXT
        .try_with(|ctx| ctx.borrow_mut().reduce())
        .unwrap_or_default()
}

/// Fold this thread's statistics into the process-wide table
pub fn fold() -> FoldSummary {
    CONTEXT
        .try_with(|ctx| ctx.borrow_mut().fold(&GLOBAL))
        .unwrap_or_default()
}

/// Forget this thread's events and statistics (see [`ProfilerContext::reset`])
pub fn reset() {
    let _ = CONTEXT.try_with(|ctx| ctx.borrow_mut().reset());
}

/// Run `f` with this thread's context
///
/// # Panics
///
/// Panics if called during thread teardown or re-entrantly.
pub fn with_context<F, R>(f: F) -> R
where
    F: FnOnce(&mut ProfilerContext) -> R,
{
    CONTEXT.with(|ctx| f(&mut ctx.borrow_mut()))
}

/// Copy of this thread's aggregated statistics
pub fn thread_stats() -> StatsTable {
    with_context(|ctx| ctx.stats().clone())
}

/// The process-wide table every thread folds into
pub fn global() -> &'static GlobalStats {
    &GLOBAL
}

/// Copy of the process-wide table
pub fn global_snapshot() -> StatsTable {
    GLOBAL.snapshot()
}

/// Scope on the current thread's context, closed on drop
///
/// Not `Send`: the scope must close on the thread that opened it.
#[must_use = "dropping the guard immediately closes the scope; bind it with `let _guard = ...`"]
pub struct ThreadScopeGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for ThreadScopeGuard {
    fn drop(&mut self) {
        end_scope();
    }
}

#[doc(hidden)]
pub fn __function_name(full: &'static str) -> &'static str {
    let name = full.strip_suffix("::__scopeprof_marker").unwrap_or(full);
    let name = name.trim_end_matches("::{{closure}}");
    name.rsplit("::").next().unwrap_or(name)
}

/// Bare name of the enclosing function, resolved once per call site
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __scopeprof_marker() {}
        fn __scopeprof_type_name<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        static __SCOPEPROF_NAME: ::std::sync::OnceLock<&'static str> =
            ::std::sync::OnceLock::new();
        *__SCOPEPROF_NAME.get_or_init(|| {
            $crate::thread_profiler::__function_name(__scopeprof_type_name(__scopeprof_marker))
        })
    }};
}

/// Profile the rest of the enclosing block under `label`
///
/// Expands to nothing with the `disabled` feature; `label` is not evaluated.
#[cfg(not(feature = "disabled"))]
#[macro_export]
macro_rules! profile_scope {
    ($label:expr) => {
        let _scopeprof_guard = $crate::thread_profiler::scope($label);
    };
}

#[cfg(feature = "disabled")]
#[macro_export]
macro_rules! profile_scope {
    ($label:expr) => {};
}

/// Profile the rest of the enclosing function under its own name
///
/// Expands to nothing with the `disabled` feature.
#[cfg(not(feature = "disabled"))]
#[macro_export]
macro_rules! profile_function {
    () => {
        let _scopeprof_guard = $crate::thread_profiler::scope($crate::function_name!());
    };
}

#[cfg(feature = "disabled")]
#[macro_export]
macro_rules! profile_function {
    () => {};
}
