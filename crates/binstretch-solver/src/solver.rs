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

//! The solver drivers.
//!
//! The parallel scheme follows the staged phases of the search: one
//! sequential *generating* pass splits the shallow game into frontier
//! tasks, scoped workers *explore* tasks to completion and drop their
//! verdicts into per-worker outboxes, and the scheduler thread drains
//! the outboxes and re-walks the shallow game in *updating* passes until
//! the root decides. Dead branches found while updating *decrease* the
//! relevance counts of their tasks so workers skip them. A raised stop
//! flag is the only way a worker exits; it is raised exactly once, when
//! the root verdict is known.
//!
//! Workers share the two caches and the task registry but own their
//! oracle and engine, so the only contention is on the registry mutex,
//! the outbox mutexes and the cache shards.

use binstretch_model::{GameTree, Problem, SolverConfig, Verdict};
use binstretch_search::{EvalMode, Minimax, SearchContext, SolverOutcome, TaskRegistry};
use rustc_hash::FxHashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard,
};
use std::time::Duration;

/// How long an idle thread sleeps before re-polling.
const IDLE_POLL: Duration = Duration::from_millis(10);

fn lock<'m, T>(mutex: &'m Mutex<T>) -> MutexGuard<'m, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// A configured solver for one problem instance.
#[derive(Debug)]
pub struct Solver {
    ctx: SearchContext,
}

impl Solver {
    /// Creates a solver for a problem with the given tuning.
    pub fn new(problem: Problem, config: SolverConfig) -> Self {
        Self {
            ctx: SearchContext::new(problem, config),
        }
    }

    /// The shared run state (caches, thresholds).
    #[inline]
    pub fn context(&self) -> &SearchContext {
        &self.ctx
    }

    /// Evaluates the game sequentially on the calling thread.
    pub fn evaluate(&self) -> SolverOutcome {
        let mut oracle = self.ctx.oracle();
        let mut conf = self.ctx.root_conf();
        let mut engine = Minimax::new(&self.ctx, &mut oracle);
        let eval = engine.adversary(&mut conf, 0, EvalMode::Exploring, None);
        let stats = *engine.stats();
        let Some(verdict) = eval.verdict() else {
            unreachable!("an exploring evaluation without a stop flag always decides");
        };
        log::info!("sequential evaluation of {}: {}", self.ctx.problem(), verdict);
        SolverOutcome {
            problem: *self.ctx.problem(),
            verdict,
            stats,
            dp_stats: *oracle.stats(),
            tree: None,
        }
    }

    /// Solves the game with the staged parallel scheme. Falls back to
    /// [`Solver::evaluate`] when configured for a single thread.
    pub fn solve(&self) -> SolverOutcome {
        let threads = self.ctx.config().threads;
        if threads <= 1 {
            return self.evaluate();
        }

        let mut outcome = SolverOutcome {
            problem: *self.ctx.problem(),
            verdict: Verdict::AlgorithmWins,
            stats: Default::default(),
            dp_stats: Default::default(),
            tree: None,
        };

        // Generating pass: split the shallow game into tasks.
        let tasks = Mutex::new(TaskRegistry::new());
        let mut oracle = self.ctx.oracle();
        let mut conf = self.ctx.root_conf();
        let generated = {
            let mut engine = Minimax::new(&self.ctx, &mut oracle).with_tasks(&tasks);
            let eval = engine.adversary(&mut conf, 0, EvalMode::Generating, None);
            outcome.stats.merge(engine.stats());
            eval
        };
        if let Some(verdict) = generated.verdict() {
            // The shallow game alone decided the root.
            log::info!("root decided during task generation: {}", verdict);
            outcome.verdict = verdict;
            outcome.dp_stats.merge(oracle.stats());
            return outcome;
        }
        log::info!(
            "task generation done: {}",
            lock(&tasks)
        );

        let stop = AtomicBool::new(false);
        let outboxes: Vec<Mutex<FxHashMap<u64, Verdict>>> =
            (0..threads).map(|_| Mutex::new(FxHashMap::default())).collect();

        let verdict = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(threads);
            for outbox in &outboxes {
                let ctx = &self.ctx;
                let tasks = &tasks;
                let stop = &stop;
                handles.push(scope.spawn(move || {
                    let mut oracle = ctx.oracle();
                    let mut engine = Minimax::new(ctx, &mut oracle).with_stop(stop);
                    loop {
                        if stop.load(Ordering::Relaxed) {
                            break;
                        }
                        let task = lock(tasks).next();
                        let Some((key, mut task_conf)) = task else {
                            std::thread::sleep(IDLE_POLL);
                            continue;
                        };
                        let eval =
                            engine.adversary(&mut task_conf, 0, EvalMode::Exploring, None);
                        match eval.verdict() {
                            Some(verdict) => {
                                lock(outbox).insert(key, verdict);
                                lock(tasks).complete(key);
                            }
                            // The stop flag interrupted the evaluation;
                            // the partial result is worthless.
                            None => {}
                        }
                    }
                    let stats = *engine.stats();
                    (stats, *oracle.stats())
                }));
            }

            // Collection loop: drain outboxes, fold verdicts towards the
            // root, stop everyone once it decides.
            let mut collected: FxHashMap<u64, Verdict> = FxHashMap::default();
            let verdict = loop {
                let mut progress = false;
                for outbox in &outboxes {
                    for (key, verdict) in lock(outbox).drain() {
                        collected.insert(key, verdict);
                        progress = true;
                    }
                }
                if !progress {
                    std::thread::sleep(IDLE_POLL);
                    continue;
                }
                let mut engine = Minimax::new(&self.ctx, &mut oracle)
                    .with_tasks(&tasks)
                    .with_collected(&collected);
                let eval = engine.adversary(&mut conf, 0, EvalMode::Updating, None);
                outcome.stats.merge(engine.stats());
                if let Some(verdict) = eval.verdict() {
                    break verdict;
                }
            };
            stop.store(true, Ordering::Relaxed);

            for handle in handles {
                match handle.join() {
                    Ok((stats, dp_stats)) => {
                        outcome.stats.merge(&stats);
                        outcome.dp_stats.merge(&dp_stats);
                    }
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            verdict
        });

        outcome.dp_stats.merge(oracle.stats());
        outcome.verdict = verdict;
        log::info!("parallel run finished: {} ({})", outcome, lock(&tasks));
        outcome
    }

    /// Solves the game and, if the Adversary wins, records the winning
    /// strategy with a fresh sequential pass.
    ///
    /// The game cache is reset first so the strategy is re-derived move
    /// by move instead of answered by a stub at the root; the warm
    /// feasibility cache keeps the pass cheap.
    pub fn solve_with_witness(&self) -> SolverOutcome {
        let mut outcome = self.solve();
        if outcome.verdict != Verdict::AdversaryWins {
            return outcome;
        }

        self.ctx.reset_game_cache();
        let mut oracle = self.ctx.oracle();
        let mut conf = self.ctx.root_conf();
        let mut tree = GameTree::new(conf.clone());
        let mut engine = Minimax::new(&self.ctx, &mut oracle);
        let eval = engine.adversary(
            &mut conf,
            0,
            EvalMode::Exploring,
            Some((&mut tree, GameTree::root())),
        );
        debug_assert_eq!(
            eval.verdict(),
            Some(Verdict::AdversaryWins),
            "witness pass disagrees with the solved verdict"
        );
        outcome.stats.merge(engine.stats());
        outcome.dp_stats.merge(oracle.stats());
        outcome.tree = Some(tree);
        outcome
    }

    /// Replaces every cached stub in a witness tree with a freshly
    /// recorded subtree, until the whole strategy is explicit.
    ///
    /// Each stub is re-evaluated from its own position with a cleared
    /// game cache; the resulting subtree is grafted over the stub in
    /// place. Grafting can surface new stubs deeper down, so the scan
    /// repeats until none remain (the game is finite, so it does).
    pub fn expand(&self, tree: &mut GameTree) {
        loop {
            let stub = tree.iter().find(|(_, node)| node.cached).map(|(id, _)| id);
            let Some(id) = stub else {
                break;
            };
            let stub_conf = tree.node(id).conf.clone();

            self.ctx.reset_game_cache();
            let mut oracle = self.ctx.oracle();
            let mut engine = Minimax::new(&self.ctx, &mut oracle);
            let mut work = stub_conf.clone();
            let mut subtree = GameTree::new(stub_conf);
            let eval = engine.adversary(
                &mut work,
                0,
                EvalMode::Exploring,
                Some((&mut subtree, GameTree::root())),
            );
            debug_assert_eq!(
                eval.verdict(),
                Some(Verdict::AdversaryWins),
                "a recorded stub must re-evaluate to an Adversary win"
            );
            tree.graft(id, &subtree);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver(capacity: u32, target: u32, bins: usize, threads: usize) -> Solver {
        let problem = Problem::new(capacity, target, bins).expect("valid problem");
        let config = SolverConfig::default()
            .with_hash_bits(14)
            .with_threads(threads)
            .with_task_depth(2);
        Solver::new(problem, config)
    }

    #[test]
    fn test_sequential_verdicts() {
        assert_eq!(
            solver(3, 3, 2, 1).evaluate().verdict,
            Verdict::AdversaryWins
        );
        assert_eq!(
            solver(2, 2, 2, 1).evaluate().verdict,
            Verdict::AlgorithmWins
        );
        assert_eq!(
            solver(3, 6, 3, 1).evaluate().verdict,
            Verdict::AlgorithmWins
        );
    }

    #[test]
    fn test_parallel_agrees_with_sequential() {
        for (capacity, target, bins) in [(3, 3, 2), (2, 2, 2), (3, 4, 2), (2, 3, 3)] {
            let sequential = solver(capacity, target, bins, 1).evaluate().verdict;
            let parallel = solver(capacity, target, bins, 3).solve().verdict;
            assert_eq!(
                sequential, parallel,
                "verdicts diverge on capacity {} target {} bins {}",
                capacity, target, bins
            );
        }
    }

    #[test]
    fn test_witness_tree_is_recorded_on_adversary_wins() {
        let s = solver(3, 3, 2, 2);
        let outcome = s.solve_with_witness();
        assert_eq!(outcome.verdict, Verdict::AdversaryWins);
        let tree = outcome.tree.expect("witness tree");
        assert!(tree.len() > 1);
        let root = tree.node(GameTree::root());
        assert!(root.next_item > 0 || root.cached);
    }

    #[test]
    fn test_three_bin_tight_target_yields_a_witness() {
        // Capacity 3, target 3 on three bins is a hard value: the
        // Adversary wins, and the recorded strategy opens with a
        // concrete first item.
        let s = solver(3, 3, 3, 2);
        let outcome = s.solve_with_witness();
        assert_eq!(outcome.verdict, Verdict::AdversaryWins);

        let mut tree = outcome.tree.expect("witness tree");
        s.expand(&mut tree);
        assert!(tree.len() > 1);

        let root = tree.node(GameTree::root());
        assert!((1..=3).contains(&root.next_item));
        // All root loads are equal, so exactly the first placement is
        // answered.
        assert!(root.children[0].is_some());
        assert!(root.children[1].is_none() && root.children[2].is_none());
        let child = tree.node(root.children[0].expect("root answer"));
        assert_eq!(child.depth, 1);
        assert_eq!(child.conf.item_total(), 1);
    }

    #[test]
    fn test_no_witness_tree_when_the_algorithm_wins() {
        let s = solver(2, 2, 2, 2);
        let outcome = s.solve_with_witness();
        assert_eq!(outcome.verdict, Verdict::AlgorithmWins);
        assert!(outcome.tree.is_none());
    }

    #[test]
    fn test_expand_removes_every_cached_stub() {
        let s = solver(3, 3, 2, 1);
        let mut outcome = s.solve_with_witness();
        let tree = outcome.tree.as_mut().expect("witness tree");
        s.expand(tree);
        assert!(tree.iter().all(|(_, node)| !node.cached));
        // After expansion every recorded node carries its move.
        for (_, node) in tree.iter() {
            assert!(node.next_item > 0 || node.leaf || node.children.iter().all(Option::is_none));
        }
    }
}
