//! Scope labels
//!
//! A `ScopeId` names a function or code region. Labels compare by text value,
//! so two labels with the same text are the same scope no matter where the
//! text lives. Equality takes a pointer fast path first because most labels
//! are string literals or interned copies.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, OnceLock};

/// Immutable scope label
#[derive(Clone, Copy)]
pub struct ScopeId(&'static str);

static INTERNER: OnceLock<Mutex<HashSet<&'static str>>> = OnceLock::new();

impl ScopeId {
    /// Placeholder for unused path slots
    pub(crate) const EMPTY: ScopeId = ScopeId("");

    /// Label from a string literal (no allocation)
    pub const fn new(label: &'static str) -> Self {
        ScopeId(label)
    }

    /// Canonical label for runtime-built text
    ///
    /// The first call for a given text leaks one copy of it; later calls return
    /// the same storage. Takes a process-wide lock, so build labels once and keep
    /// the `ScopeId` rather than interning inside hot loops.
    pub fn intern(label: &str) -> Self {
        let set = INTERNER.get_or_init(|| Mutex::new(HashSet::new()));
        let mut set = set.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(&existing) = set.get(label) {
            return ScopeId(existing);
        }
        let leaked: &'static str = Box::leak(label.to_owned().into_boxed_str());
        set.insert(leaked);
        ScopeId(leaked)
    }

    /// Label text
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl PartialEq for ScopeId {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0) || self.0 == other.0
    }
}

impl Eq for ScopeId {}

impl Hash for ScopeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialOrd for ScopeId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScopeId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if std::ptr::eq(self.0, other.0) {
            return std::cmp::Ordering::Equal;
        }
        self.0.cmp(other.0)
    }
}

impl From<&'static str> for ScopeId {
    fn from(label: &'static str) -> Self {
        ScopeId(label)
    }
}

impl From<String> for ScopeId {
    fn from(label: String) -> Self {
        ScopeId::intern(&label)
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({:?})", self.0)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
