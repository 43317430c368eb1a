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

//! Shared per-run search state.
//!
//! One `SearchContext` is built per solver run and outlives every engine
//! and worker of that run. It owns the two caches (game verdicts keyed
//! by the combined hash, offline feasibility keyed by the item hash
//! alone) and the resolved task-splitting thresholds. Workers clone the
//! cache handles; the Zobrist tables are shared so every configuration
//! of the run hashes identically.

use binstretch_dp::FeasibilityOracle;
use binstretch_model::{BinConf, Problem, SolverConfig, TransTable, Verdict, Zobrist};
use std::sync::Arc;

/// Everything the engines of one run share.
#[derive(Debug)]
pub struct SearchContext {
    problem: Problem,
    config: SolverConfig,
    zobrist: Arc<Zobrist>,
    game_cache: Arc<TransTable<Verdict>>,
    dp_cache: Arc<TransTable<bool>>,
    task_load: u32,
}

impl SearchContext {
    /// Builds the shared state for a run: Zobrist tables, both caches,
    /// and the task frontier resolved for this problem.
    pub fn new(problem: Problem, config: SolverConfig) -> Self {
        let zobrist = Arc::new(Zobrist::new(&problem));
        let game_cache = Arc::new(TransTable::new(&config));
        let dp_cache = Arc::new(TransTable::new(&config));
        let task_load = config.task_load_for(problem.max_total_load());
        Self {
            problem,
            config,
            zobrist,
            game_cache,
            dp_cache,
            task_load,
        }
    }

    /// The problem being solved.
    #[inline]
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// The tuning knobs of this run.
    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The game cache mapping combined hashes to verdicts.
    #[inline]
    pub fn game_cache(&self) -> &Arc<TransTable<Verdict>> {
        &self.game_cache
    }

    /// The offline-feasibility cache.
    #[inline]
    pub fn dp_cache(&self) -> &Arc<TransTable<bool>> {
        &self.dp_cache
    }

    /// The empty root configuration of this run.
    pub fn root_conf(&self) -> BinConf {
        BinConf::new(&self.problem, self.zobrist.clone())
    }

    /// A fresh oracle wired to the shared feasibility cache. Each worker
    /// owns one (the queue scratch space is not shared).
    pub fn oracle(&self) -> FeasibilityOracle {
        FeasibilityOracle::new(self.dp_cache.clone())
    }

    /// Returns true if an Adversary position at this depth and total
    /// load lies past the task frontier.
    #[inline]
    pub fn is_task_frontier(&self, depth: u32, total_load: u32) -> bool {
        depth > self.config.task_depth || total_load > self.task_load
    }

    /// Clears the game cache. Used before the witness pass so the
    /// winning strategy is re-derived move by move instead of answered
    /// by a cache stub at the root. The feasibility cache stays warm;
    /// offline feasibility does not depend on how a verdict was reached.
    pub fn reset_game_cache(&self) {
        self.game_cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontier_thresholds() {
        let problem = Problem::new(4, 6, 3).expect("valid problem");
        let ctx = SearchContext::new(problem, SolverConfig::default().with_task_depth(2));
        // max_total_load = 12, default task_load = 6; both strict.
        assert!(!ctx.is_task_frontier(2, 6));
        assert!(ctx.is_task_frontier(3, 0));
        assert!(ctx.is_task_frontier(0, 7));
    }

    #[test]
    fn test_root_conf_is_empty_and_shared_zobrist() {
        let problem = Problem::new(4, 6, 3).expect("valid problem");
        let ctx = SearchContext::new(problem, SolverConfig::default());
        let a = ctx.root_conf();
        let b = ctx.root_conf();
        assert_eq!(a.key(), 0);
        assert!(Arc::ptr_eq(a.zobrist(), b.zobrist()));
    }
}
