//! Per-path timing statistics
//!
//! `Stat` is a commutative monoid under `+` with identity `Stat::ZERO`, and
//! `-` undoes a previous `+` exactly. The cross-thread merge depends on both.

use crate::path_encoder::{PathEncoder, DEFAULT_MAX_DEPTH};
use std::collections::btree_map::{self, BTreeMap};
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::time::Duration;

/// Accumulated time and visit count for one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stat {
    pub total_duration: Duration,
    pub visit_count: u64,
}

impl Stat {
    pub const ZERO: Stat = Stat {
        total_duration: Duration::ZERO,
        visit_count: 0,
    };

    /// A single visit lasting `duration`
    pub const fn visit(duration: Duration) -> Self {
        Stat {
            total_duration: duration,
            visit_count: 1,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Stat::ZERO
    }

    /// Mean visit duration, zero when never visited
    pub fn average(&self) -> Duration {
        if self.visit_count == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total_duration.as_nanos() / u128::from(self.visit_count);
        Duration::from_nanos(nanos as u64)
    }
}

impl AddAssign for Stat {
    fn add_assign(&mut self, rhs: Stat) {
        self.total_duration += rhs.total_duration;
        self.visit_count += rhs.visit_count;
    }
}

impl Add for Stat {
    type Output = Stat;

    fn add(mut self, rhs: Stat) -> Stat {
        self += rhs;
        self
    }
}

impl SubAssign for Stat {
    /// Saturates at zero; exact whenever `rhs` was previously added
    fn sub_assign(&mut self, rhs: Stat) {
        self.total_duration = self.total_duration.saturating_sub(rhs.total_duration);
        self.visit_count = self.visit_count.saturating_sub(rhs.visit_count);
    }
}

impl Sub for Stat {
    type Output = Stat;

    fn sub(mut self, rhs: Stat) -> Stat {
        self -= rhs;
        self
    }
}

/// Statistics keyed by call path, iterated in path order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsTable<const D: usize = DEFAULT_MAX_DEPTH> {
    entries: BTreeMap<PathEncoder<D>, Stat>,
}

impl<const D: usize> StatsTable<D> {
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add one visit of `duration` to `path`
    pub fn record(&mut self, path: &PathEncoder<D>, duration: Duration) {
        self.add(path, Stat::visit(duration));
    }

    /// `self[path] += stat`, inserting the identity first if absent
    pub fn add(&mut self, path: &PathEncoder<D>, stat: Stat) {
        *self.entries.entry(*path).or_default() += stat;
    }

    /// `self[path] -= stat`; entries that fall back to zero are dropped
    pub fn subtract(&mut self, path: &PathEncoder<D>, stat: Stat) {
        if let btree_map::Entry::Occupied(mut entry) = self.entries.entry(*path) {
            *entry.get_mut() -= stat;
            if entry.get().is_zero() {
                entry.remove();
            }
        }
    }

    /// Add every entry of `other`
    pub fn merge(&mut self, other: &StatsTable<D>) {
        for (path, stat) in other {
            self.add(path, *stat);
        }
    }

    pub fn get(&self, path: &PathEncoder<D>) -> Option<&Stat> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, PathEncoder<D>, Stat> {
        self.entries.iter()
    }

    /// Sum of visit counts over every path
    pub fn total_visits(&self) -> u64 {
        self.entries.values().map(|s| s.visit_count).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<const D: usize> Default for StatsTable<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const D: usize> IntoIterator for &'a StatsTable<D> {
    type Item = (&'a PathEncoder<D>, &'a Stat);
    type IntoIter = btree_map::Iter<'a, PathEncoder<D>, Stat>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<const D: usize> FromIterator<(PathEncoder<D>, Stat)> for StatsTable<D> {
    fn from_iter<I: IntoIterator<Item = (PathEncoder<D>, Stat)>>(iter: I) -> Self {
        let mut table = StatsTable::new();
        for (path, stat) in iter {
            table.add(&path, stat);
        }
        table
    }
}
