//! In-memory retention
//!
//! A `HistoryBuffer` keeps the most recent items under a retention policy.
//! Eviction is strictly FIFO: once full, every push drops the oldest item.

use std::collections::VecDeque;
use std::ops::Index;

/// How much history to keep in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Retention {
    /// Keep nothing (the default for plain loggers)
    #[default]
    Off,
    /// Keep everything
    Unbounded,
    /// Keep the most recent `n` items
    Last(usize),
}

impl Retention {
    /// Maximum item count, or `None` for unbounded
    ///
    /// `Last(0)` behaves exactly like `Off`.
    pub fn capacity(&self) -> Option<usize> {
        match self {
            Retention::Off => Some(0),
            Retention::Unbounded => None,
            Retention::Last(n) => Some(*n),
        }
    }
}

/// A FIFO buffer bounded by a [`Retention`] policy
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    items: VecDeque<T>,
    retention: Retention,
}

impl<T> HistoryBuffer<T> {
    /// Create an empty buffer
    pub fn new(retention: Retention) -> Self {
        let items = match retention.capacity() {
            Some(cap) => VecDeque::with_capacity(cap.min(1024)),
            None => VecDeque::new(),
        };
        Self { items, retention }
    }

    /// The policy this buffer was built with
    pub fn retention(&self) -> Retention {
        self.retention
    }

    /// Append an item, evicting the oldest when full
    pub fn push(&mut self, item: T) {
        match self.retention.capacity() {
            Some(0) => {}
            Some(cap) => {
                if self.items.len() == cap {
                    self.items.pop_front();
                }
                self.items.push_back(item);
            }
            None => self.items.push_back(item),
        }
    }

    /// Number of retained items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is retained
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item at `index`, oldest first
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// The most recently pushed item
    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    /// Iterate retained items, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Drop all retained items, keeping the policy
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> Index<usize> for HistoryBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}
