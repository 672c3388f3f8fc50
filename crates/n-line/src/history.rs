//! Command history: a bounded, most-recent-first ring of submitted lines.
//!
//! The store is owned by the caller and lent to each [`read_line`] call, so
//! one history outlives any number of editing sessions. Recording is an
//! explicit step: the REPL engine never records on its own, which lets the
//! caller decide what is worth keeping (skipping blank lines, say).
//!
//! ```
//! use n_line::history::History;
//!
//! let mut history = History::new(2);
//! history.record("first\n");
//! history.record("second  \n");
//! history.record("third");
//!
//! assert_eq!(history.len(), 2);
//! assert_eq!(history.get(0), Some("third"));
//! assert_eq!(history.get(1), Some("second"));
//! ```
//!
//! [`read_line`]: crate::repl::read_line

use std::collections::VecDeque;

/// Fixed-capacity history, index 0 being the most recent entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
}

impl History {
    /// An empty history holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a submitted line.
    ///
    /// Trailing whitespace (including the line terminator) is trimmed. The
    /// entry becomes index 0; every older entry moves one slot toward the
    /// tail and the oldest is dropped once the store is full.
    pub fn record(&mut self, entry: &str) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(entry.trim_end().to_string());
        tracing::trace!(len = self.entries.len(), "history entry recorded");
    }

    /// Entry `index` positions back from the most recent.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Number of stored entries (`<= capacity`).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from most recent to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_HISTORY_CAPACITY)
    }
}
