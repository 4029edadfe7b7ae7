//! Bounded history of broadcast messages
//!
//! Keeps the most recent serialized broadcast lines so a client can ask for
//! them with a `history` request. Oldest entries are evicted first.

use std::collections::VecDeque;

use parking_lot::Mutex;

/// Default number of retained messages
pub const DEFAULT_HISTORY_SIZE: usize = 20;

/// Ring buffer of recent broadcast lines
///
/// Thread-safe; the lock is only held for the push or copy itself.
#[derive(Debug)]
pub struct HistoryCache {
    entries: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl HistoryCache {
    /// Create a cache holding at most `capacity` messages
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append a message, evicting the oldest once at capacity
    pub fn record(&self, message: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }

        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(message.into());
    }

    /// Copy of the stored messages, oldest first
    pub fn snapshot(&self) -> impl Iterator<Item = String> {
        let entries: Vec<String> = self.entries.lock().iter().cloned().collect();
        entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
