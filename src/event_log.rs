//! Per-thread raw scope events and the Begin/End protocol
//!
//! `begin` pushes the label onto the current path and appends an open event
//! keyed by that path. `end` closes the newest open event whose logical depth
//! equals the current depth, then pops the path.
//!
//! Matching by depth alone is sound only under strict LIFO nesting. Any scope
//! opened at the same depth after the one being closed must already have been
//! closed, so the newest open event at that depth is the matching Begin. The
//! backward scan touches only events recorded since that Begin.
//!
//! Preconditions (not checked): every `begin` is matched by exactly one `end`
//! on the same thread, in LIFO order. An unmatched `begin` leaves an event
//! open forever and inflates the depth seen by later events.

use crate::clock::Timestamp;
use crate::path_encoder::{PathEncoder, DEFAULT_MAX_DEPTH};
use crate::scope_id::ScopeId;
use std::time::Duration;

/// One scope execution, open until `end` is set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent<const D: usize = DEFAULT_MAX_DEPTH> {
    /// Path at Begin time, including the scope itself
    pub path: PathEncoder<D>,
    pub start: Timestamp,
    /// `None` while the scope is still running
    pub end: Option<Timestamp>,
}

impl<const D: usize> RawEvent<D> {
    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    /// Elapsed time, if closed
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end - self.start)
    }
}

/// Append-only event log plus the path it is recorded against
#[derive(Debug, Clone)]
pub struct ScopeEventLog<const D: usize = DEFAULT_MAX_DEPTH> {
    path: PathEncoder<D>,
    events: Vec<RawEvent<D>>,
}

impl<const D: usize> ScopeEventLog<D> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Log with room for `capacity` events before reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            path: PathEncoder::new(),
            events: Vec::with_capacity(capacity),
        }
    }

    /// Open a scope at time `now`
    #[inline]
    pub fn begin(&mut self, id: ScopeId, now: Timestamp) {
        self.begin_with(id, || now);
    }

    /// Open a scope, stamping it with `now()` once the path is updated
    ///
    /// The push is not billed to the new scope.
    #[inline]
    pub fn begin_with<F>(&mut self, id: ScopeId, now: F)
    where
        F: FnOnce() -> Timestamp,
    {
        self.path.push(id);
        let start = now();
        self.events.push(RawEvent {
            path: self.path,
            start,
            end: None,
        });
    }

    /// Close the innermost open scope at time `now`
    #[inline]
    pub fn end(&mut self, now: Timestamp) {
        let depth = self.path.size();
        if let Some(event) = self
            .events
            .iter_mut()
            .rev()
            .find(|e| e.end.is_none() && e.path.size() == depth)
        {
            event.end = Some(now);
        }
        self.path.pop();
    }

    /// Current path
    pub fn path(&self) -> &PathEncoder<D> {
        &self.path
    }

    pub fn events(&self) -> &[RawEvent<D>] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events still waiting for their `end`
    pub fn open_count(&self) -> usize {
        self.events.iter().filter(|e| !e.is_closed()).count()
    }

    /// Keep only the events for which `keep` returns true
    pub(crate) fn retain_events<F>(&mut self, keep: F)
    where
        F: FnMut(&RawEvent<D>) -> bool,
    {
        self.events.retain(keep);
    }

    /// Drop every event and return to an empty path
    pub fn clear(&mut self) {
        self.events.clear();
        self.path = PathEncoder::new();
    }
}

impl<const D: usize> Default for ScopeEventLog<D> {
    fn default() -> Self {
        Self::new()
    }
}
