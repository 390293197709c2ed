//! Entry filters
//!
//! A filter transforms an entry before a sink sees it: dropping noisy
//! keys, rounding floats, renaming fields. Filters compose into a
//! `FilterSet`, applied in order. Each non-empty set carries a process-wide
//! identity so the logger can run a chain once per `log` call even when
//! several sinks share it; sinks share work by holding clones of the same
//! set.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use jot_protocol::Entry;

/// One entry transform
pub type Filter = Arc<dyn Fn(Entry) -> Entry + Send + Sync>;

/// Wrap a closure as a [`Filter`]
pub fn filter_fn<F>(f: F) -> Filter
where
    F: Fn(Entry) -> Entry + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Identity 0 is reserved for the empty set; real sets start at 1
static NEXT_FILTER_SET_ID: AtomicU64 = AtomicU64::new(1);

/// An ordered chain of entry transforms with a shared identity
///
/// Clones keep the identity of the set they were cloned from, which is
/// what makes sharing work: two sinks holding clones of one set cost one
/// chain application per logged entry.
#[derive(Clone)]
pub struct FilterSet {
    id: u64,
    filters: Vec<Filter>,
}

impl FilterSet {
    /// Create an empty set (identity 0, applies no transforms)
    pub fn new() -> Self {
        Self {
            id: 0,
            filters: Vec::new(),
        }
    }

    /// Build a set from a chain of filters, applied front to back
    pub fn from_filters(filters: Vec<Filter>) -> Self {
        if filters.is_empty() {
            return Self::new();
        }
        Self {
            id: NEXT_FILTER_SET_ID.fetch_add(1, Ordering::Relaxed),
            filters,
        }
    }

    /// The shared empty set
    pub fn empty() -> &'static FilterSet {
        static EMPTY: OnceLock<FilterSet> = OnceLock::new();
        EMPTY.get_or_init(FilterSet::new)
    }

    /// Identity used for memoization (0 for the empty set)
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of filters in the chain
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the set applies no transforms
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run the chain over a copy of `entry`
    pub fn apply(&self, entry: &Entry) -> Entry {
        let mut current = entry.clone();
        for filter in &self.filters {
            current = filter(current);
        }
        current
    }
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSet")
            .field("id", &self.id)
            .field("len", &self.filters.len())
            .finish()
    }
}
