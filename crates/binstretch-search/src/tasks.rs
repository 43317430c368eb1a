// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The registry of positions split off as worker tasks.
//!
//! The generating pass stops at a depth/load frontier and registers the
//! frontier positions here, deduplicated by their combined Zobrist key.
//! A position reached along several paths gets one task with an
//! occurrence count; the count is advisory (it drives pruning, never
//! correctness). When an updating pass proves a branch dead it
//! decrements the counts below it, and a task whose count reaches zero
//! while still queued is parked as irrelevant. Parking can overshoot
//! for positions shared with live branches, so an updating pass that
//! still needs a parked, uncomputed task reactivates it.
//!
//! The registry is shared behind a mutex: the scheduler adds, workers
//! take, both sides transition statuses.

use binstretch_model::BinConf;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Lifecycle of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Waiting for a worker.
    Queued,
    /// A worker owns the evaluation.
    Running,
    /// No live branch currently needs the verdict.
    Irrelevant,
    /// Verdict delivered.
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Queued => write!(f, "Queued"),
            TaskStatus::Running => write!(f, "Running"),
            TaskStatus::Irrelevant => write!(f, "Irrelevant"),
            TaskStatus::Completed => write!(f, "Completed"),
        }
    }
}

#[derive(Debug)]
struct TaskEntry {
    conf: BinConf,
    status: TaskStatus,
    occurrences: u32,
}

/// Deduplicated queue of frontier positions awaiting evaluation.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    entries: FxHashMap<u64, TaskEntry>,
    queue: VecDeque<u64>,
    generated: u64,
    completed: u64,
    pruned: u64,
    reactivated: u64,
}

impl TaskRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a frontier position. A position already known only has
    /// its occurrence count bumped.
    pub fn add(&mut self, conf: &BinConf) {
        let key = conf.key();
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.occurrences += 1;
            return;
        }
        self.entries.insert(
            key,
            TaskEntry {
                conf: conf.clone(),
                status: TaskStatus::Queued,
                occurrences: 1,
            },
        );
        self.queue.push_back(key);
        self.generated += 1;
        log::debug!("task {:#x} registered: {}", key, conf);
    }

    /// Hands the next queued task to a worker, marking it running.
    /// Stale queue entries (parked or already taken) are skipped.
    pub fn next(&mut self) -> Option<(u64, BinConf)> {
        while let Some(key) = self.queue.pop_front() {
            if let Some(entry) = self.entries.get_mut(&key) {
                if entry.status == TaskStatus::Queued {
                    entry.status = TaskStatus::Running;
                    return Some((key, entry.conf.clone()));
                }
            }
        }
        None
    }

    /// Marks a task's verdict as delivered.
    pub fn complete(&mut self, key: u64) {
        if let Some(entry) = self.entries.get_mut(&key) {
            if entry.status != TaskStatus::Completed {
                entry.status = TaskStatus::Completed;
                self.completed += 1;
            }
        }
    }

    /// Drops one occurrence of a task; a queued task with no occurrences
    /// left is parked as irrelevant.
    pub fn decrement(&mut self, key: u64) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.occurrences = entry.occurrences.saturating_sub(1);
            if entry.occurrences == 0 && entry.status == TaskStatus::Queued {
                entry.status = TaskStatus::Irrelevant;
                self.pruned += 1;
            }
        }
    }

    /// Puts a parked task back in the queue; a live branch turned out to
    /// need it after all. Unknown keys are registered afresh.
    pub fn reactivate(&mut self, key: u64, conf: &BinConf) {
        match self.entries.get_mut(&key) {
            Some(entry) if entry.status == TaskStatus::Irrelevant => {
                entry.status = TaskStatus::Queued;
                entry.occurrences = entry.occurrences.max(1);
                self.queue.push_back(key);
                self.reactivated += 1;
                log::debug!("task {:#x} reactivated", key);
            }
            Some(_) => {}
            None => self.add(conf),
        }
    }

    /// Current status of a task.
    #[inline]
    pub fn status(&self, key: u64) -> Option<TaskStatus> {
        self.entries.get(&key).map(|entry| entry.status)
    }

    /// Occurrence count of a task.
    #[inline]
    pub fn occurrences(&self, key: u64) -> u32 {
        self.entries.get(&key).map_or(0, |entry| entry.occurrences)
    }

    /// Number of registered tasks.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no task was ever registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tasks still waiting for a worker.
    pub fn queued(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.status == TaskStatus::Queued)
            .count()
    }

    /// Tasks registered over the whole run.
    #[inline]
    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Tasks whose verdict was delivered.
    #[inline]
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Tasks parked as irrelevant at least once.
    #[inline]
    pub fn pruned(&self) -> u64 {
        self.pruned
    }

    /// Parked tasks put back in the queue.
    #[inline]
    pub fn reactivated(&self) -> u64 {
        self.reactivated
    }
}

impl std::fmt::Display for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TaskRegistry(generated: {}, completed: {}, pruned: {}, reactivated: {}, queued: {})",
            self.generated,
            self.completed,
            self.pruned,
            self.reactivated,
            self.queued()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binstretch_model::{BinIndex, Problem, Zobrist};
    use std::sync::Arc;

    fn confs() -> (BinConf, BinConf) {
        let problem = Problem::new(5, 7, 2).expect("valid problem");
        let zobrist = Arc::new(Zobrist::new(&problem));
        let mut a = BinConf::new(&problem, zobrist.clone());
        a.place(3, BinIndex::new(0));
        let mut b = BinConf::new(&problem, zobrist);
        b.place(2, BinIndex::new(0));
        (a, b)
    }

    #[test]
    fn test_add_deduplicates_by_key() {
        let (a, b) = confs();
        let mut registry = TaskRegistry::new();
        registry.add(&a);
        registry.add(&b);
        registry.add(&a);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.generated(), 2);
        assert_eq!(registry.occurrences(a.key()), 2);
        assert_eq!(registry.occurrences(b.key()), 1);
    }

    #[test]
    fn test_next_transitions_to_running_in_fifo_order() {
        let (a, b) = confs();
        let mut registry = TaskRegistry::new();
        registry.add(&a);
        registry.add(&b);

        let (key, conf) = registry.next().expect("first task");
        assert_eq!(key, a.key());
        assert_eq!(conf, a);
        assert_eq!(registry.status(key), Some(TaskStatus::Running));

        let (key, _) = registry.next().expect("second task");
        assert_eq!(key, b.key());
        assert!(registry.next().is_none());
    }

    #[test]
    fn test_decrement_parks_only_drained_queued_tasks() {
        let (a, b) = confs();
        let mut registry = TaskRegistry::new();
        registry.add(&a);
        registry.add(&a);
        registry.add(&b);

        registry.decrement(a.key());
        assert_eq!(registry.status(a.key()), Some(TaskStatus::Queued));
        registry.decrement(a.key());
        assert_eq!(registry.status(a.key()), Some(TaskStatus::Irrelevant));
        assert_eq!(registry.pruned(), 1);

        // A running task is never parked.
        let (key, _) = registry.next().expect("task b");
        assert_eq!(key, b.key());
        registry.decrement(b.key());
        assert_eq!(registry.status(b.key()), Some(TaskStatus::Running));
    }

    #[test]
    fn test_reactivate_requeues_a_parked_task() {
        let (a, _) = confs();
        let mut registry = TaskRegistry::new();
        registry.add(&a);
        registry.decrement(a.key());
        assert!(registry.next().is_none());

        registry.reactivate(a.key(), &a);
        assert_eq!(registry.status(a.key()), Some(TaskStatus::Queued));
        assert_eq!(registry.reactivated(), 1);
        let (key, _) = registry.next().expect("reactivated task");
        assert_eq!(key, a.key());
    }

    #[test]
    fn test_complete_counts_once() {
        let (a, _) = confs();
        let mut registry = TaskRegistry::new();
        registry.add(&a);
        let (key, _) = registry.next().expect("task");
        registry.complete(key);
        registry.complete(key);
        assert_eq!(registry.completed(), 1);
        assert_eq!(registry.status(key), Some(TaskStatus::Completed));
    }
}
