//! Bounded activity log shown in the agent terminal.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// Default number of retained notes.
pub const DEFAULT_LOG_CAPACITY: usize = 30;

/// A single progress note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    /// Monotonic across the whole log lifetime, including evicted entries.
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub text: String,
}

/// Fixed-capacity ring buffer of the most recent notes.
///
/// Appending never fails; when full, the oldest entry is evicted.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
    next_seq: u64,
}

impl ActivityLog {
    /// Capacity is clamped to at least one entry.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(target: "vibesplit::activity", "{}", text);
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ActivityEntry {
            seq: self.next_seq,
            at: Utc::now(),
            text,
        });
        self.next_seq += 1;
    }

    pub fn extend<I, S>(&mut self, notes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for note in notes {
            self.push(note);
        }
    }

    /// Drops every entry. Sequence numbers keep counting.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.text.as_str()).collect()
    }

    pub fn last(&self) -> Option<&ActivityEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_evicts_oldest_first() {
        let mut log = ActivityLog::with_capacity(3);
        log.extend(["a", "b", "c", "d"]);
        assert_eq!(log.texts(), vec!["b", "c", "d"]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_default_capacity_is_thirty() {
        let mut log = ActivityLog::default();
        for i in 0..45 {
            log.push(format!("note {i}"));
        }
        assert_eq!(log.len(), 30);
        assert_eq!(log.iter().next().unwrap().text, "note 15");
        assert_eq!(log.last().unwrap().text, "note 44");
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut log = ActivityLog::with_capacity(0);
        log.push("only");
        log.push("latest");
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.texts(), vec!["latest"]);
    }

    #[test]
    fn test_clear_keeps_sequence_counting() {
        let mut log = ActivityLog::with_capacity(5);
        log.extend(["a", "b"]);
        log.clear();
        assert!(log.is_empty());
        log.push("c");
        assert_eq!(log.last().unwrap().seq, 2);
    }

    proptest! {
        #[test]
        fn prop_keeps_most_recent_in_order(capacity in 1usize..40, count in 0usize..120) {
            let mut log = ActivityLog::with_capacity(capacity);
            for i in 0..count {
                log.push(i.to_string());
            }
            let expected: Vec<String> = (count.saturating_sub(capacity)..count)
                .map(|i| i.to_string())
                .collect();
            let actual: Vec<String> = log.iter().map(|e| e.text.clone()).collect();
            prop_assert_eq!(actual, expected);
            let seqs: Vec<u64> = log.iter().map(|e| e.seq).collect();
            prop_assert!(seqs.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
