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

//! Tuning knobs for the caches and the task scheduler.
//!
//! None of these affect the verdict, only how fast it is reached and how
//! much memory is spent on the way. The defaults correspond to the
//! constants the search was originally tuned with.

/// Configuration of cache sizing and task splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Bit width of the transposition-table index; the table holds
    /// `1 << hash_bits` buckets.
    pub hash_bits: u32,
    /// Maximum length of a collision chain in one bucket. Beyond this the
    /// table stops deduplicating and the search falls back to
    /// recomputation.
    pub chain_limit: usize,
    /// Bit width of the lock-shard index; `1 << shard_bits` mutexes each
    /// guard a contiguous range of buckets.
    pub shard_bits: u32,
    /// Number of worker threads for the parallel solver.
    pub threads: usize,
    /// Total-load threshold past which an Adversary node becomes a task.
    /// `None` selects `S * BINS / 2` for the problem at hand.
    pub task_load: Option<u32>,
    /// Depth threshold past which an Adversary node becomes a task.
    pub task_depth: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            hash_bits: 20,
            chain_limit: 4,
            shard_bits: 10,
            threads: 8,
            task_load: None,
            task_depth: 4,
        }
    }
}

impl SolverConfig {
    /// Creates the default configuration.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transposition-table index width.
    #[inline]
    pub fn with_hash_bits(mut self, hash_bits: u32) -> Self {
        self.hash_bits = hash_bits;
        self
    }

    /// Sets the number of worker threads.
    #[inline]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets an explicit task-split load threshold.
    #[inline]
    pub fn with_task_load(mut self, task_load: u32) -> Self {
        self.task_load = Some(task_load);
        self
    }

    /// Sets the task-split depth threshold.
    #[inline]
    pub fn with_task_depth(mut self, task_depth: u32) -> Self {
        self.task_depth = task_depth;
        self
    }

    /// Resolves the task-split load threshold for a concrete problem.
    #[inline]
    pub fn task_load_for(&self, max_total_load: u32) -> u32 {
        self.task_load.unwrap_or(max_total_load / 2)
    }
}

impl std::fmt::Display for SolverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SolverConfig(hash_bits: {}, chain_limit: {}, shard_bits: {}, threads: {}, task_load: {:?}, task_depth: {})",
            self.hash_bits,
            self.chain_limit,
            self.shard_bits,
            self.threads,
            self.task_load,
            self.task_depth
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_task_load_is_half_of_full() {
        let config = SolverConfig::default();
        assert_eq!(config.task_load_for(42), 21);
        assert_eq!(config.with_task_load(10).task_load_for(42), 10);
    }

    #[test]
    fn test_builder_style_setters() {
        let config = SolverConfig::new().with_threads(2).with_hash_bits(12);
        assert_eq!(config.threads, 2);
        assert_eq!(config.hash_bits, 12);
        assert_eq!(config.chain_limit, 4);
    }
}
