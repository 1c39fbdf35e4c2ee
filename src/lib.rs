//! Scopeprof - low-overhead in-process call-path profiler
//!
//! Code marks scopes with begin/end pairs (or guards). Each execution context
//! records raw events against the current call path, periodically reduces them
//! into per-path statistics, and folds those into a process-wide table without
//! double counting.
//!
//! Two ways in:
//!
//! - [`ProfilerContext`]: an explicit per-worker context, generic over the
//!   clock and the stored path depth.
//! - [`thread_profiler`]: one context per OS thread behind the
//!   [`profile_scope!`] and [`profile_function!`] macros.

pub mod aggregator;
pub mod cli;
pub mod clock;
pub mod config;
pub mod context;
pub mod demo;
pub mod error;
pub mod event_log;
pub mod json_output;
pub mod merger;
pub mod path_encoder;
pub mod report;
pub mod scope_id;
pub mod stats;
pub mod thread_profiler;

pub use aggregator::{reduce, ReduceSummary};
pub use clock::{Clock, ManualClock, MonotonicClock, Timestamp};
pub use config::ProfilerConfig;
pub use context::{ProfilerContext, ScopeGuard};
pub use error::{ProfilerError, Result};
pub use event_log::{RawEvent, ScopeEventLog};
pub use merger::{FoldSummary, GlobalStats, LastContribution};
pub use path_encoder::{PathEncoder, DEFAULT_MAX_DEPTH};
pub use report::{ReportOptions, SortOrder, TimeUnit};
pub use scope_id::ScopeId;
pub use stats::{Stat, StatsTable};
pub use thread_profiler::ThreadScopeGuard;
