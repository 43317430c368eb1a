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

//! The two-player minimax recursion.
//!
//! An Adversary position enumerates candidate item sizes from the
//! largest offline-feasible one downwards and wins as soon as one
//! candidate wins. An Algorithm position enumerates bin placements and
//! survives as soon as one placement survives; a placement that would
//! push the bin past the stretched target is never taken, and if every
//! placement would, the position is an Adversary win outright. Bins with
//! equal loads are interchangeable under the sorted representation, so
//! only the first of each run is tried.
//!
//! The recursion mutates a single [`BinConf`] in place and undoes every
//! move on the way out. Decided positions are memoized in the shared
//! game cache under the combined Zobrist key.
//!
//! One engine serves all four scheduler phases via [`EvalMode`]; see the
//! crate docs for how the phases interlock. When a [`GameTree`] is
//! attached the engine additionally records the winning Adversary
//! strategy: candidate branches are built optimistically and rolled back
//! when the candidate fails.

use crate::{context::SearchContext, stats::SearchStatistics, tasks::TaskRegistry};
use binstretch_dp::FeasibilityOracle;
use binstretch_model::{
    BinConf, BinIndex, Evaluation, GameTree, NodeId, PositionValue, Verdict,
};
use rustc_hash::FxHashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard,
};

/// The scheduler phase an evaluation runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    /// Stop at the task frontier and register frontier positions.
    Generating,
    /// Evaluate to completion (worker tasks, sequential runs, the
    /// witness pass).
    Exploring,
    /// Re-walk the shallow tree folding in collected task verdicts.
    Updating,
    /// Walk a dead branch decrementing task occurrence counts.
    Decreasing,
}

impl std::fmt::Display for EvalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalMode::Generating => write!(f, "Generating"),
            EvalMode::Exploring => write!(f, "Exploring"),
            EvalMode::Updating => write!(f, "Updating"),
            EvalMode::Decreasing => write!(f, "Decreasing"),
        }
    }
}

fn lock_registry(tasks: &Mutex<TaskRegistry>) -> MutexGuard<'_, TaskRegistry> {
    match tasks.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// One minimax engine: a context handle, a private oracle, and private
/// counters. Workers own one each.
pub struct Minimax<'a> {
    ctx: &'a SearchContext,
    oracle: &'a mut FeasibilityOracle,
    stats: SearchStatistics,
    stop: Option<&'a AtomicBool>,
    tasks: Option<&'a Mutex<TaskRegistry>>,
    collected: Option<&'a FxHashMap<u64, Verdict>>,
}

impl<'a> Minimax<'a> {
    /// Creates an engine over a shared context and a private oracle.
    pub fn new(ctx: &'a SearchContext, oracle: &'a mut FeasibilityOracle) -> Self {
        Self {
            ctx,
            oracle,
            stats: SearchStatistics::default(),
            stop: None,
            tasks: None,
            collected: None,
        }
    }

    /// Attaches a cooperative stop flag; a raised flag aborts the
    /// evaluation with [`Evaluation::Postponed`].
    pub fn with_stop(mut self, stop: &'a AtomicBool) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Attaches the shared task registry (generating, updating and
    /// decreasing phases).
    pub fn with_tasks(mut self, tasks: &'a Mutex<TaskRegistry>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Attaches the collected task verdicts (updating phase).
    pub fn with_collected(mut self, collected: &'a FxHashMap<u64, Verdict>) -> Self {
        self.collected = Some(collected);
        self
    }

    /// The counters accumulated so far.
    #[inline]
    pub fn stats(&self) -> &SearchStatistics {
        &self.stats
    }

    /// Evaluates an Adversary position: the Adversary is about to choose
    /// the next item size. `depth` counts items sent so far; `tree`, when
    /// present, is the witness node for this position.
    pub fn adversary(
        &mut self,
        conf: &mut BinConf,
        depth: u32,
        mode: EvalMode,
        tree: Option<(&mut GameTree, NodeId)>,
    ) -> Evaluation {
        self.stats.on_adversary_node();
        let mut tree = tree;

        if let Some(stop) = self.stop {
            if stop.load(Ordering::Relaxed) {
                return Evaluation::Postponed;
            }
        }

        let key = conf.key();
        if let Some(verdict) = self.ctx.game_cache().lookup(key) {
            self.stats.on_cache_hit();
            if let Some((t, id)) = tree.as_mut() {
                t.mark_cached(*id);
                t.node_mut(*id)
                    .conf
                    .set_value(PositionValue::Decided(verdict));
            }
            return Evaluation::Decided(verdict);
        }

        if !matches!(mode, EvalMode::Exploring)
            && self.ctx.is_task_frontier(depth, conf.total_load())
        {
            return self.at_frontier(conf, key, mode);
        }

        let max_item = self.oracle.max_feasible_item(conf);
        if max_item == 0 {
            // The offline bins are exhausted; the Adversary has nothing
            // left to send.
            return self.decide(key, Verdict::AlgorithmWins, mode, tree);
        }

        let mut postponed = false;
        for item in (1..=max_item).rev() {
            let mark = tree.as_ref().map(|(t, _)| t.watermark());
            if let Some((t, id)) = tree.as_mut() {
                t.set_next_item(*id, item);
            }
            let sub = tree.as_mut().map(|(t, id)| (&mut **t, *id));
            let result = self.algorithm(conf, item, depth, mode, sub);

            if matches!(mode, EvalMode::Decreasing) {
                continue;
            }
            match result {
                Evaluation::Decided(Verdict::AdversaryWins) => {
                    if matches!(mode, EvalMode::Updating) {
                        self.decrease_siblings(conf, depth, item, max_item);
                    }
                    return self.decide(key, Verdict::AdversaryWins, mode, tree);
                }
                Evaluation::Decided(Verdict::AlgorithmWins) | Evaluation::Postponed => {
                    if let (Some((t, id)), Some(mark)) = (tree.as_mut(), mark) {
                        t.rollback(*id, mark);
                    }
                    if result.is_postponed() {
                        postponed = true;
                    }
                }
            }
        }

        if matches!(mode, EvalMode::Decreasing) || postponed {
            return Evaluation::Postponed;
        }
        self.decide(key, Verdict::AlgorithmWins, mode, tree)
    }

    /// Evaluates an Algorithm position: `item` has been announced and
    /// the Algorithm picks the bin.
    fn algorithm(
        &mut self,
        conf: &mut BinConf,
        item: u32,
        depth: u32,
        mode: EvalMode,
        tree: Option<(&mut GameTree, NodeId)>,
    ) -> Evaluation {
        self.stats.on_algorithm_node();
        let mut tree = tree;
        let target = self.ctx.problem().target();

        let mut postponed = false;
        let mut any_placement = false;
        for b in 0..conf.bins() {
            // Bins with equal loads are interchangeable.
            if b > 0 && conf.load(BinIndex::new(b)) == conf.load(BinIndex::new(b - 1)) {
                continue;
            }
            if conf.load(BinIndex::new(b)) + item > target {
                continue;
            }
            any_placement = true;

            let result = conf.with_placed(item, BinIndex::new(b), |conf, _rank| {
                let sub = match tree.as_mut() {
                    Some((t, id)) => {
                        let child = t.push(conf.clone(), depth + 1);
                        t.set_child(*id, b, child);
                        Some((&mut **t, child))
                    }
                    None => None,
                };
                self.adversary(conf, depth + 1, mode, sub)
            });

            if matches!(mode, EvalMode::Decreasing) {
                continue;
            }
            match result {
                Evaluation::Decided(Verdict::AlgorithmWins) => return result,
                Evaluation::Decided(Verdict::AdversaryWins) => {}
                Evaluation::Postponed => postponed = true,
            }
        }

        if matches!(mode, EvalMode::Decreasing) {
            return Evaluation::Postponed;
        }
        if !any_placement {
            // Every placement would overflow: the announced item wins.
            if let Some((t, id)) = tree.as_mut() {
                t.mark_leaf(*id);
            }
            return Evaluation::Decided(Verdict::AdversaryWins);
        }
        if postponed {
            Evaluation::Postponed
        } else {
            Evaluation::Decided(Verdict::AdversaryWins)
        }
    }

    /// Handles an Adversary position sitting on the task frontier.
    fn at_frontier(&mut self, conf: &mut BinConf, key: u64, mode: EvalMode) -> Evaluation {
        match mode {
            EvalMode::Generating => {
                if let Some(tasks) = self.tasks {
                    lock_registry(tasks).add(conf);
                    return Evaluation::Postponed;
                }
                // No registry attached: degrade to a full evaluation.
                self.adversary_past_frontier(conf)
            }
            EvalMode::Updating => {
                if let Some(verdict) = self.collected.and_then(|m| m.get(&key)).copied() {
                    self.ctx.game_cache().insert(key, verdict);
                    self.stats.on_cache_insert();
                    return Evaluation::Decided(verdict);
                }
                if let Some(tasks) = self.tasks {
                    lock_registry(tasks).reactivate(key, conf);
                }
                Evaluation::Postponed
            }
            EvalMode::Decreasing => {
                if let Some(tasks) = self.tasks {
                    lock_registry(tasks).decrement(key);
                }
                Evaluation::Postponed
            }
            EvalMode::Exploring => unreachable!("the frontier is ignored while exploring"),
        }
    }

    fn adversary_past_frontier(&mut self, conf: &mut BinConf) -> Evaluation {
        // Depth no longer matters: Exploring never consults the frontier.
        self.adversary(conf, 0, EvalMode::Exploring, None)
    }

    /// After one item decided an Updating node, sweep the sibling item
    /// branches and drop their claims on still-queued tasks.
    fn decrease_siblings(&mut self, conf: &mut BinConf, depth: u32, winning: u32, max_item: u32) {
        if self.tasks.is_none() {
            return;
        }
        for item in (1..=max_item).rev() {
            if item == winning {
                continue;
            }
            self.algorithm(conf, item, depth, EvalMode::Decreasing, None);
        }
    }

    /// Records a decided position in the cache and, when recording a
    /// witness, on the tree node.
    fn decide(
        &mut self,
        key: u64,
        verdict: Verdict,
        mode: EvalMode,
        mut tree: Option<(&mut GameTree, NodeId)>,
    ) -> Evaluation {
        if !matches!(mode, EvalMode::Decreasing) {
            self.ctx.game_cache().insert(key, verdict);
            self.stats.on_cache_insert();
        }
        if let Some((t, id)) = tree.as_mut() {
            t.node_mut(*id)
                .conf
                .set_value(PositionValue::Decided(verdict));
        }
        Evaluation::Decided(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binstretch_model::{Problem, SolverConfig};

    fn context(capacity: u32, target: u32, bins: usize) -> SearchContext {
        let problem = Problem::new(capacity, target, bins).expect("valid problem");
        SearchContext::new(problem, SolverConfig::default().with_hash_bits(14))
    }

    fn explore(ctx: &SearchContext) -> Verdict {
        let mut oracle = ctx.oracle();
        let mut engine = Minimax::new(ctx, &mut oracle);
        let mut conf = ctx.root_conf();
        engine
            .adversary(&mut conf, 0, EvalMode::Exploring, None)
            .verdict()
            .expect("exploring always decides")
    }

    /// Reference evaluation without the equal-load placement pruning and
    /// without the maximum-feasible bound: the Adversary tries every
    /// offline-feasible size, the Algorithm every bin. Terminates because
    /// feasibility fails once the offline bins are exhausted.
    fn reference_adversary(
        oracle: &mut FeasibilityOracle,
        conf: &mut BinConf,
        target: u32,
    ) -> Verdict {
        let capacity = conf.size_limit();
        for item in (1..=capacity).rev() {
            if !oracle.check_item(conf, item) {
                continue;
            }
            let mut survives = false;
            for b in 0..conf.bins() {
                if conf.load(BinIndex::new(b)) + item > target {
                    continue;
                }
                let verdict = conf.with_placed(item, BinIndex::new(b), |conf, _rank| {
                    reference_adversary(oracle, conf, target)
                });
                if verdict == Verdict::AlgorithmWins {
                    survives = true;
                    break;
                }
            }
            if !survives {
                return Verdict::AdversaryWins;
            }
        }
        Verdict::AlgorithmWins
    }

    #[test]
    fn test_placement_pruning_matches_full_enumeration() {
        // The equal-load skip must never change a verdict; check against
        // the exhaustive reference on instances with repeated loads.
        for (capacity, target, bins) in [(2, 2, 2), (3, 3, 2), (3, 4, 2), (2, 3, 3), (3, 3, 3)] {
            let ctx = context(capacity, target, bins);
            let mut oracle = ctx.oracle();
            let mut conf = ctx.root_conf();
            let reference = reference_adversary(&mut oracle, &mut conf, target);
            assert_eq!(
                explore(&ctx),
                reference,
                "pruned and exhaustive search disagree on {}",
                ctx.problem()
            );
        }
    }

    #[test]
    fn test_adversary_wins_tight_target_two_bins() {
        // Capacity 3, target 3: sending 1, 1 leads to (1, 1) where a 3
        // overflows both bins, or to (2, 0) where two 2s do.
        let ctx = context(3, 3, 2);
        assert_eq!(explore(&ctx), Verdict::AdversaryWins);
    }

    #[test]
    fn test_algorithm_wins_tight_target_small_capacity() {
        // Capacity 2, target 2 on two bins: stacking early items defuses
        // every continuation.
        let ctx = context(2, 2, 2);
        assert_eq!(explore(&ctx), Verdict::AlgorithmWins);
    }

    #[test]
    fn test_algorithm_wins_with_doubled_target() {
        // Target 2S on three bins: some bin always has load at most S,
        // so no item ever overflows.
        let ctx = context(3, 6, 3);
        assert_eq!(explore(&ctx), Verdict::AlgorithmWins);
    }

    #[test]
    fn test_root_is_answered_from_cache_on_reevaluation() {
        let ctx = context(3, 3, 2);
        assert_eq!(explore(&ctx), Verdict::AdversaryWins);

        let mut oracle = ctx.oracle();
        let mut engine = Minimax::new(&ctx, &mut oracle);
        let mut conf = ctx.root_conf();
        let eval = engine.adversary(&mut conf, 0, EvalMode::Exploring, None);
        assert_eq!(eval.verdict(), Some(Verdict::AdversaryWins));
        assert_eq!(engine.stats().adversary_nodes, 1);
        assert_eq!(engine.stats().cache_hits, 1);
    }

    #[test]
    fn test_evaluation_leaves_the_configuration_untouched() {
        let ctx = context(3, 3, 2);
        let mut oracle = ctx.oracle();
        let mut engine = Minimax::new(&ctx, &mut oracle);
        let mut conf = ctx.root_conf();
        engine.adversary(&mut conf, 0, EvalMode::Exploring, None);
        assert_eq!(conf.total_load(), 0);
        assert_eq!(conf.item_total(), 0);
        assert_eq!(conf.key(), 0);
        assert!(conf.is_consistent());
    }

    #[test]
    fn test_generating_pass_postpones_and_registers_tasks() {
        let problem = Problem::new(3, 3, 2).expect("valid problem");
        let config = SolverConfig::default()
            .with_hash_bits(14)
            .with_task_depth(1);
        let ctx = SearchContext::new(problem, config);
        let tasks = Mutex::new(TaskRegistry::new());

        let mut oracle = ctx.oracle();
        let mut engine = Minimax::new(&ctx, &mut oracle).with_tasks(&tasks);
        let mut conf = ctx.root_conf();
        let eval = engine.adversary(&mut conf, 0, EvalMode::Generating, None);

        assert!(eval.is_postponed());
        let registry = tasks.lock().expect("registry lock");
        assert!(!registry.is_empty());
        // With task_depth 1 every position two items deep is a task.
        assert!(registry.generated() >= 2);
    }

    #[test]
    fn test_witness_records_a_playable_winning_strategy() {
        let ctx = context(3, 3, 2);
        let mut oracle = ctx.oracle();
        let mut engine = Minimax::new(&ctx, &mut oracle);
        let mut conf = ctx.root_conf();
        let mut tree = GameTree::new(conf.clone());

        let eval = engine.adversary(
            &mut conf,
            0,
            EvalMode::Exploring,
            Some((&mut tree, GameTree::root())),
        );
        assert_eq!(eval.verdict(), Some(Verdict::AdversaryWins));
        assert!(tree.len() > 1);

        let target = ctx.problem().target();
        for (id, node) in tree.iter() {
            if node.cached {
                continue;
            }
            assert!(
                node.next_item > 0,
                "node {} has no item recorded",
                id
            );
            if node.leaf {
                // Terminal: the recorded item overflows every bin.
                for b in 0..node.conf.bins() {
                    assert!(node.conf.loads()[b] + node.next_item > target);
                }
                continue;
            }
            // Interior: every surviving placement has a recorded child
            // whose configuration extends this one by the recorded item.
            for b in 0..node.conf.bins() {
                let load = node.conf.loads()[b];
                if b > 0 && load == node.conf.loads()[b - 1] {
                    continue;
                }
                if load + node.next_item > target {
                    continue;
                }
                let child = node.children[b].unwrap_or_else(|| {
                    panic!("node {} is missing the answer for bin {}", id, b)
                });
                let child_node = tree.node(child);
                assert_eq!(child_node.depth, node.depth + 1);
                assert_eq!(
                    child_node.conf.item_total(),
                    node.conf.item_total() + 1
                );
            }
        }
    }
}
