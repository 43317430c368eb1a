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

//! The feasibility oracle: sparse dynamic program plus cached binary
//! search.
//!
//! The dynamic program walks the items of size at least 3 from largest
//! to smallest, maintaining the set of offline load tuples reachable by
//! packing the processed prefix. The set is sparse (a vector of radix
//! codes, sorted so duplicates sit adjacent) and typically tiny compared
//! to the full `(S+1)^BINS` space. Items of sizes 1 and 2 are never
//! expanded: for each surviving tuple a counting argument closes them
//! out in O(BINS).
//!
//! Every answer is memoized in a shared [`TransTable`] keyed by the
//! configuration's item hash alone. Loads never matter to offline
//! feasibility, so two game positions with the same item multiset share
//! one cache entry across all workers.
//!
//! Each oracle owns its queue scratch space; workers hold one oracle
//! each and share only the cache.

use crate::{fits::best_fit_bound, tuple};
use binstretch_model::{BinConf, TransTable};
use smallvec::SmallVec;
use std::sync::Arc;

/// Initial capacity of the reachable-tuple queues.
const QUEUE_RESERVE: usize = 100_000;

/// Counters describing the oracle's work. Purely diagnostic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DpStatistics {
    /// Full dynamic-program runs.
    pub tests: u64,
    /// Probes answered out of the shared cache.
    pub cache_hits: u64,
    /// Calls to [`FeasibilityOracle::max_feasible_item`].
    pub max_feasible_calls: u64,
}

impl DpStatistics {
    #[inline]
    fn on_test(&mut self) {
        self.tests += 1;
    }

    #[inline]
    fn on_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    #[inline]
    fn on_max_feasible(&mut self) {
        self.max_feasible_calls += 1;
    }

    /// Folds another worker's counters into this one.
    pub fn merge(&mut self, other: &DpStatistics) {
        self.tests += other.tests;
        self.cache_hits += other.cache_hits;
        self.max_feasible_calls += other.max_feasible_calls;
    }
}

impl std::fmt::Display for DpStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DpStatistics(tests: {}, cache hits: {}, max-feasible calls: {})",
            self.tests, self.cache_hits, self.max_feasible_calls
        )
    }
}

/// Answers offline-feasibility questions about item multisets.
#[derive(Debug)]
pub struct FeasibilityOracle {
    cache: Arc<TransTable<bool>>,
    old_queue: Vec<u64>,
    new_queue: Vec<u64>,
    stats: DpStatistics,
}

impl FeasibilityOracle {
    /// Creates an oracle backed by a (typically shared) feasibility cache.
    pub fn new(cache: Arc<TransTable<bool>>) -> Self {
        Self {
            cache,
            old_queue: Vec::with_capacity(QUEUE_RESERVE),
            new_queue: Vec::with_capacity(QUEUE_RESERVE),
            stats: DpStatistics::default(),
        }
    }

    /// The counters accumulated so far.
    #[inline]
    pub fn stats(&self) -> &DpStatistics {
        &self.stats
    }

    /// Runs the dynamic program directly on the configuration's current
    /// item multiset, bypassing the cache.
    pub fn is_feasible(&mut self, conf: &BinConf) -> bool {
        self.stats.on_test();
        let mut old_queue = std::mem::take(&mut self.old_queue);
        let mut new_queue = std::mem::take(&mut self.new_queue);
        let feasible = sparse_feasibility_test(conf, &mut old_queue, &mut new_queue);
        self.old_queue = old_queue;
        self.new_queue = new_queue;
        feasible
    }

    /// Tests whether the multiset plus one extra item of `size` is still
    /// offline-feasible. The configuration is probed reversibly and
    /// comes back hash-identical.
    pub fn check_item(&mut self, conf: &mut BinConf, size: u32) -> bool {
        conf.with_probe(size, |conf| {
            let key = conf.itemhash();
            if let Some(hit) = self.cache.lookup(key) {
                self.stats.on_cache_hit();
                log::trace!("feasibility cache hit for item hash {:#x}: {}", key, hit);
                return hit;
            }
            let feasible = self.is_feasible(conf);
            self.cache.insert(key, feasible);
            feasible
        })
    }

    /// The largest item the Adversary may send from this position, or 0
    /// if the offline bins are exhausted.
    ///
    /// Bracket first (Best Fit Decreasing below, `min(S, S*BINS - total)`
    /// above), then binary-search the interval with cached feasibility
    /// probes. The invariant is that `lb` is always known feasible and
    /// everything above `ub` known infeasible.
    pub fn max_feasible_item(&mut self, conf: &mut BinConf) -> u32 {
        self.stats.on_max_feasible();

        let capacity = conf.size_limit();
        let remaining = conf.bins() as u32 * capacity - conf.total_load();
        let upper = capacity.min(remaining);
        let lower = best_fit_bound(conf).min(upper);

        if upper <= lower {
            return lower;
        }

        let (mut lb, mut ub) = (lower, upper);
        let mut mid = (lb + ub + 1) / 2;
        while lb < ub {
            if self.check_item(conf, mid) {
                lb = mid;
            } else {
                ub = mid - 1;
            }
            mid = (lb + ub + 1) / 2;
        }
        log::trace!("max feasible item for {} is {}", conf, lb);
        lb
    }
}

/// The sparse dynamic program over radix-encoded offline load tuples.
///
/// Starts from the empty packing and folds in every placed item of size
/// at least 3, largest first. `old_queue` holds the reachable tuples for
/// the processed prefix (sorted, possibly with adjacent duplicates);
/// `new_queue` collects the successors. Sizes 2 and 1 are closed out per
/// surviving tuple by the counting argument: the size-1 items only need
/// total free space, the size-2 items additionally need enough per-bin
/// free space counted in pairs.
fn sparse_feasibility_test(
    conf: &BinConf,
    old_queue: &mut Vec<u64>,
    new_queue: &mut Vec<u64>,
) -> bool {
    let bins = conf.bins();
    let capacity = conf.size_limit();
    let radix = u64::from(capacity) + 1;
    let mut work: SmallVec<[u32; 8]> = smallvec::smallvec![0; bins];

    old_queue.clear();
    new_queue.clear();
    // Seed with the empty packing; multisets without any item of size
    // at least 3 then go straight to the close-out.
    old_queue.push(0);

    for size in (3..=capacity).rev() {
        for _ in 0..conf.item_count(size) {
            let mut previous = None;
            for i in 0..old_queue.len() {
                let code = old_queue[i];
                if previous == Some(code) {
                    continue;
                }
                previous = Some(code);
                tuple::decode(code, radix, &mut work);

                for b in 0..bins {
                    // Equal loads are interchangeable; try only the first.
                    if b > 0 && work[b] == work[b - 1] {
                        continue;
                    }
                    if work[b] + size > capacity {
                        continue;
                    }
                    work[b] += size;
                    let at = tuple::resort_increased(&mut work, b);
                    new_queue.push(tuple::encode(&work, radix));
                    work[at] -= size;
                    tuple::resort_decreased(&mut work, at);
                }
            }
            if new_queue.is_empty() {
                return false;
            }
            std::mem::swap(old_queue, new_queue);
            old_queue.sort_unstable();
            new_queue.clear();
        }
    }

    let ones = conf.item_count(1);
    let twos = conf.item_count(2);
    let mut previous = None;
    for &code in old_queue.iter() {
        if previous == Some(code) {
            continue;
        }
        previous = Some(code);
        tuple::decode(code, radix, &mut work);

        let free: u32 = work.iter().map(|&load| capacity - load).sum();
        let free_pairs: u32 = work.iter().map(|&load| (capacity - load) / 2).sum();
        if free < ones + 2 * twos {
            continue;
        }
        if free_pairs >= twos {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use binstretch_model::{BinIndex, Problem, SolverConfig, Zobrist};

    fn setup(capacity: u32, bins: usize) -> (BinConf, FeasibilityOracle) {
        let problem = Problem::new(capacity, capacity + 2, bins).expect("valid problem");
        let zobrist = Arc::new(Zobrist::new(&problem));
        let cache = Arc::new(TransTable::new(
            &SolverConfig::default().with_hash_bits(12),
        ));
        (BinConf::new(&problem, zobrist), FeasibilityOracle::new(cache))
    }

    fn with_items(conf: &mut BinConf, items: &[u32]) {
        for &size in items {
            conf.add_item(size);
        }
    }

    #[test]
    fn test_empty_multiset_is_feasible() {
        let (conf, mut oracle) = setup(5, 2);
        assert!(oracle.is_feasible(&conf));
    }

    #[test]
    fn test_large_items_one_per_bin() {
        let (mut conf, mut oracle) = setup(4, 2);
        with_items(&mut conf, &[4, 4]);
        assert!(oracle.is_feasible(&conf));
        conf.add_item(4);
        assert!(!oracle.is_feasible(&conf));
    }

    #[test]
    fn test_small_items_need_paired_space() {
        let (mut conf, mut oracle) = setup(4, 2);
        // {3, 3, 2}: the 3s block both bins at load 3 and the 2 has no
        // pair-slot left.
        with_items(&mut conf, &[3, 3, 2]);
        assert!(!oracle.is_feasible(&conf));

        // {3, 2, 2, 1} fits as {3, 1} and {2, 2}.
        let (mut conf, mut oracle) = setup(4, 2);
        with_items(&mut conf, &[3, 2, 2, 1]);
        assert!(oracle.is_feasible(&conf));
    }

    #[test]
    fn test_multisets_without_large_items() {
        // Exercises the close-out directly from the empty packing.
        let (mut conf, mut oracle) = setup(4, 2);
        with_items(&mut conf, &[2, 2, 2, 2]);
        assert!(oracle.is_feasible(&conf));

        let (mut conf, mut oracle) = setup(4, 2);
        with_items(&mut conf, &[2, 2, 2, 2, 2]);
        assert!(!oracle.is_feasible(&conf));
    }

    #[test]
    fn test_feasibility_is_monotone_under_removal() {
        let (mut conf, mut oracle) = setup(5, 3);
        with_items(&mut conf, &[5, 4, 3, 2, 1]);
        assert!(oracle.is_feasible(&conf));
        // Dropping any single item keeps the multiset feasible.
        for size in 1..=5 {
            conf.remove_item(size);
            assert!(oracle.is_feasible(&conf), "infeasible without size {}", size);
            conf.add_item(size);
        }
    }

    #[test]
    fn test_feasible_sizes_form_a_prefix() {
        // The sendable sizes are downward closed: if one more item of
        // size x still packs offline, so does any smaller one. The
        // binary search in max_feasible_item relies on this.
        let multisets: &[&[u32]] = &[
            &[],
            &[5],
            &[5, 4],
            &[4, 4, 3],
            &[5, 5, 4, 1],
            &[3, 2, 2, 1],
        ];
        for items in multisets {
            let (mut conf, mut oracle) = setup(5, 3);
            with_items(&mut conf, items);
            let mut seen_infeasible = false;
            for size in 1..=5 {
                let feasible = oracle.check_item(&mut conf, size);
                assert!(
                    !(feasible && seen_infeasible),
                    "size {} feasible above a smaller infeasible size for {:?}",
                    size,
                    items
                );
                seen_infeasible |= !feasible;
            }
        }
    }

    #[test]
    fn test_check_item_restores_the_configuration_and_caches() {
        let (mut conf, mut oracle) = setup(4, 2);
        with_items(&mut conf, &[3, 3]);
        let itemhash = conf.itemhash();

        assert!(oracle.check_item(&mut conf, 1));
        assert!(!oracle.check_item(&mut conf, 2));
        assert_eq!(conf.itemhash(), itemhash);

        // The same probes again come out of the cache.
        let tests_before = oracle.stats().tests;
        let hits_before = oracle.stats().cache_hits;
        assert!(oracle.check_item(&mut conf, 1));
        assert!(!oracle.check_item(&mut conf, 2));
        assert_eq!(oracle.stats().tests, tests_before);
        assert_eq!(oracle.stats().cache_hits, hits_before + 2);
    }

    #[test]
    fn test_max_feasible_item_closes_the_bracket() {
        // Loads (3, 3) on capacity 4: only a size-1 item remains sendable.
        let (mut conf, mut oracle) = setup(4, 2);
        conf.place(3, BinIndex::new(0));
        conf.place(3, BinIndex::new(1));
        assert_eq!(oracle.max_feasible_item(&mut conf), 1);
    }

    #[test]
    fn test_max_feasible_item_without_probing() {
        // The Best Fit bound meets the upper bound, so no probe is paid.
        let (mut conf, mut oracle) = setup(5, 2);
        conf.place(4, BinIndex::new(0));
        assert_eq!(oracle.max_feasible_item(&mut conf), 5);
        assert_eq!(oracle.stats().tests, 0);
    }

    #[test]
    fn test_max_feasible_item_on_exhausted_bins() {
        let (mut conf, mut oracle) = setup(3, 2);
        conf.place(3, BinIndex::new(0));
        conf.place(3, BinIndex::new(1));
        assert_eq!(oracle.max_feasible_item(&mut conf), 0);
    }
}
