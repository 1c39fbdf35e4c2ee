//! Bounded call-path encoding
//!
//! A `PathEncoder` is the current stack of active scopes, outermost first,
//! stored in a fixed inline array of `D` slots. Pushes past `D` still bump the
//! logical `size` but are not stored, so deep paths collide once they share
//! their first `D` labels. The overflow is visible as `size() - capacity()`.
//!
//! ```
//! use scopeprof::{PathEncoder, ScopeId};
//!
//! let mut path: PathEncoder<2> = PathEncoder::new();
//! path.push(ScopeId::new("main"));
//! path.push(ScopeId::new("load"));
//! path.push(ScopeId::new("parse"));
//! assert_eq!(path.size(), 3);
//! assert_eq!(path.capacity(), 2);
//! assert_eq!(path.to_string(), "main/load/...(1)");
//! ```

use crate::scope_id::ScopeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stored depth used when no explicit bound is chosen
pub const DEFAULT_MAX_DEPTH: usize = 15;

/// Fixed-capacity scope stack with overflow counting
#[derive(Clone, Copy)]
pub struct PathEncoder<const D: usize = DEFAULT_MAX_DEPTH> {
    ids: [ScopeId; D],
    /// Stored entries, always `min(size, D)`
    fill: u16,
    /// Logical depth including overflow, saturating at `u16::MAX`
    size: u16,
}

impl<const D: usize> PathEncoder<D> {
    const DEPTH_IS_VALID: () = assert!(D > 0 && D <= u16::MAX as usize, "path depth out of range");

    /// Empty path
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::DEPTH_IS_VALID;
        Self {
            ids: [ScopeId::EMPTY; D],
            fill: 0,
            size: 0,
        }
    }

    /// Maximum stored depth
    pub const fn max_depth() -> usize {
        D
    }

    /// Logical depth, including entries beyond the bound
    #[inline]
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Number of stored entries
    #[inline]
    pub fn capacity(&self) -> usize {
        self.fill as usize
    }

    /// Entries counted but not stored
    #[inline]
    pub fn truncated(&self) -> usize {
        (self.size - self.fill) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Enter a scope
    #[inline]
    pub fn push(&mut self, id: ScopeId) {
        self.size = self.size.saturating_add(1);
        if (self.fill as usize) < D {
            self.ids[self.fill as usize] = id;
            self.fill += 1;
        }
    }

    /// Leave the innermost scope
    ///
    /// While the logical depth is still at or beyond `D` the removed entry is an
    /// unstored overflow entry, so the stored prefix stays intact. Popping an
    /// empty path does nothing.
    #[inline]
    pub fn pop(&mut self) {
        if self.size == 0 {
            return;
        }
        self.size -= 1;
        if (self.size as usize) < D {
            self.fill -= 1;
            self.ids[self.fill as usize] = ScopeId::EMPTY;
        }
    }

    /// Stored labels, outermost first
    pub fn labels(&self) -> impl Iterator<Item = ScopeId> + '_ {
        self.stored().iter().copied()
    }

    /// Innermost stored label
    pub fn last(&self) -> Option<ScopeId> {
        self.stored().last().copied()
    }

    fn stored(&self) -> &[ScopeId] {
        &self.ids[..self.fill as usize]
    }
}

impl<const D: usize> Default for PathEncoder<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> PartialEq for PathEncoder<D> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.stored() == other.stored()
    }
}

impl<const D: usize> Eq for PathEncoder<D> {}

impl<const D: usize> PartialOrd for PathEncoder<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const D: usize> Ord for PathEncoder<D> {
    /// Shorter logical paths sort first; equal depths compare stored labels.
    fn cmp(&self, other: &Self) -> Ordering {
        self.size
            .cmp(&other.size)
            .then_with(|| self.stored().cmp(other.stored()))
    }
}

impl<const D: usize> Hash for PathEncoder<D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.size.hash(state);
        self.stored().hash(state);
    }
}

impl<const D: usize> fmt::Display for PathEncoder<D> {
    /// `a/b/c`, with `/...(N)` appended when `N` labels were not stored
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.labels().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(id.as_str())?;
        }
        if self.truncated() > 0 {
            write!(f, "/...({})", self.truncated())?;
        }
        Ok(())
    }
}

impl<const D: usize> fmt::Debug for PathEncoder<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathEncoder")
            .field("path", &self.to_string())
            .field("size", &self.size)
            .field("capacity", &self.fill)
            .finish()
    }
}
