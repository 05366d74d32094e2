#![forbid(unsafe_code)]

//! Submitted query history with a navigation cursor.
//!
//! Entries are append-only. The navigation index counts back from the end:
//! `0` is the live buffer, `1` the most recent entry, `len()` the oldest. It
//! always stays within `0..=len()`.

/// Ordered list of submitted queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
    index: usize,
}

impl History {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current navigation index (0 = live buffer).
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Entry `distance` steps back from the end (1 = most recent).
    #[must_use]
    pub fn get(&self, distance: usize) -> Option<&str> {
        if distance == 0 {
            return None;
        }
        let position = self.entries.len().checked_sub(distance)?;
        self.entries.get(position).map(String::as_str)
    }

    /// Append a submitted query and return to the live position.
    pub fn record(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
        self.index = 0;
    }

    /// Step to the next older entry.
    ///
    /// Returns `None` when already at the oldest entry (or the history is
    /// empty); the index does not move.
    pub fn move_older(&mut self) -> Option<&str> {
        if self.index >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.get(self.index)
    }

    /// Step to the next newer entry.
    ///
    /// Stepping back onto the live position yields `""`. Returns `None` when
    /// already there.
    pub fn move_newer(&mut self) -> Option<&str> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        if self.index == 0 {
            return Some("");
        }
        self.get(self.index)
    }

    /// Return to the live position without changing entries.
    pub fn reset(&mut self) {
        self.index = 0;
    }
}
