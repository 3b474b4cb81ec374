//! Bounded, append-only activity log

use std::collections::VecDeque;

use crate::types::{LogEntry, Severity};

/// Maximum number of entries retained by an [`ActivityLog`]
pub const ACTIVITY_LOG_CAPACITY: usize = 50;

/// Ordered record of operator-visible session events.
///
/// Appending is the only mutation. Once more than [`ACTIVITY_LOG_CAPACITY`]
/// entries exist the oldest ones are evicted, so the log always holds the
/// most recent entries in insertion order.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    next_seq: u64,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(ACTIVITY_LOG_CAPACITY),
            next_seq: 0,
        }
    }

    /// Append an entry stamped with the current time, evicting from the head
    /// if the log is over capacity.
    pub fn append(&mut self, message: impl Into<String>, severity: Severity) -> &LogEntry {
        let entry = LogEntry::new(self.next_seq, severity, message);
        self.next_seq += 1;
        self.entries.push_back(entry);
        while self.entries.len() > ACTIVITY_LOG_CAPACITY {
            self.entries.pop_front();
        }
        // Just pushed, so the deque is non-empty.
        &self.entries[self.entries.len() - 1]
    }

    pub fn info(&mut self, message: impl Into<String>) -> &LogEntry {
        self.append(message, Severity::Info)
    }

    pub fn success(&mut self, message: impl Into<String>) -> &LogEntry {
        self.append(message, Severity::Success)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> &LogEntry {
        self.append(message, Severity::Warning)
    }

    pub fn error(&mut self, message: impl Into<String>) -> &LogEntry {
        self.append(message, Severity::Error)
    }

    /// Copy of the retained entries, oldest first
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Retained entries appended after `seq` (exclusive), oldest first.
    ///
    /// Pass `None` to get everything retained.
    pub fn entries_since(&self, seq: Option<u64>) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|e| seq.map_or(true, |s| e.seq > s))
            .cloned()
            .collect()
    }

    /// Iterate over entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        ACTIVITY_LOG_CAPACITY
    }

    /// Most recently appended entry
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Sequence number of the most recent append, if any
    pub fn last_seq(&self) -> Option<u64> {
        self.next_seq.checked_sub(1)
    }

    /// Total appends over the log's lifetime, including evicted ones
    pub fn total_appended(&self) -> u64 {
        self.next_seq
    }
}
