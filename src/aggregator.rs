//! Reduction of raw events into per-path statistics
//!
//! Closed events are folded into the `StatsTable` and dropped from the log.
//! Open events stay in the log, in order, for a later pass. Running `reduce`
//! again with nothing newly closed changes nothing, so it is safe to call at
//! any cadence, including while long-running or recursive scopes are open.

use crate::event_log::ScopeEventLog;
use crate::stats::StatsTable;

/// Outcome of one reduction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReduceSummary {
    /// Closed events moved into the table
    pub aggregated: usize,
    /// Open events left in the log
    pub retained: usize,
}

/// Move every closed event from `log` into `stats`
pub fn reduce<const D: usize>(
    log: &mut ScopeEventLog<D>,
    stats: &mut StatsTable<D>,
) -> ReduceSummary {
    let mut summary = ReduceSummary::default();

    log.retain_events(|event| match event.duration() {
        Some(duration) => {
            stats.record(&event.path, duration);
            summary.aggregated += 1;
            false
        }
        None => {
            summary.retained += 1;
            true
        }
    });

    tracing::trace!(
        aggregated = summary.aggregated,
        retained = summary.retained,
        paths = stats.len(),
        "reduced scope events"
    );

    summary
}
