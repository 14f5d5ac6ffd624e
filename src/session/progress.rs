//! Completion tracking for the three sub-tasks.

use serde::{Deserialize, Serialize};

/// One of the three experiences that unlock the finale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubTask {
    Analyst,
    Duelist,
    Creator,
}

impl SubTask {
    pub const ALL: [SubTask; 3] = [SubTask::Analyst, SubTask::Duelist, SubTask::Creator];

    pub fn label(self) -> &'static str {
        match self {
            Self::Analyst => "Analyst",
            Self::Duelist => "Duelist",
            Self::Creator => "Creator",
        }
    }
}

/// Three independent, monotonic completion flags.
///
/// Flags only go back to false through [`ProgressTracker::reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTracker {
    pub analyst: bool,
    pub duelist: bool,
    pub creator: bool,
}

impl ProgressTracker {
    pub const TOTAL: usize = 3;

    pub fn complete(&mut self, task: SubTask) {
        match task {
            SubTask::Analyst => self.analyst = true,
            SubTask::Duelist => self.duelist = true,
            SubTask::Creator => self.creator = true,
        }
    }

    pub fn is_complete(&self, task: SubTask) -> bool {
        match task {
            SubTask::Analyst => self.analyst,
            SubTask::Duelist => self.duelist,
            SubTask::Creator => self.creator,
        }
    }

    pub fn completed_count(&self) -> usize {
        [self.analyst, self.duelist, self.creator]
            .into_iter()
            .filter(|done| *done)
            .count()
    }

    pub fn finale_unlocked(&self) -> bool {
        self.completed_count() == Self::TOTAL
    }

    pub fn complete_all(&mut self) {
        *self = Self {
            analyst: true,
            duelist: true,
            creator: true,
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn task_strategy() -> impl Strategy<Value = SubTask> {
        prop_oneof![
            Just(SubTask::Analyst),
            Just(SubTask::Duelist),
            Just(SubTask::Creator),
        ]
    }

    #[test]
    fn test_starts_locked() {
        let progress = ProgressTracker::default();
        assert_eq!(progress.completed_count(), 0);
        assert!(!progress.finale_unlocked());
    }

    #[test]
    fn test_repeat_completion_counts_once() {
        let mut progress = ProgressTracker::default();
        progress.complete(SubTask::Creator);
        progress.complete(SubTask::Creator);
        assert_eq!(progress.completed_count(), 1);
        assert!(progress.is_complete(SubTask::Creator));
    }

    #[test]
    fn test_reset() {
        let mut progress = ProgressTracker::default();
        progress.complete_all();
        assert!(progress.finale_unlocked());
        progress.reset();
        assert_eq!(progress, ProgressTracker::default());
    }

    proptest! {
        #[test]
        fn prop_monotonic_and_exact_gate(tasks in proptest::collection::vec(task_strategy(), 0..12)) {
            let mut progress = ProgressTracker::default();
            let mut seen = std::collections::HashSet::new();
            let mut last = 0;
            for task in tasks {
                progress.complete(task);
                seen.insert(task);
                let count = progress.completed_count();
                prop_assert!(count >= last);
                prop_assert_eq!(count, seen.len());
                prop_assert_eq!(progress.finale_unlocked(), seen.len() == 3);
                last = count;
            }
        }
    }
}
