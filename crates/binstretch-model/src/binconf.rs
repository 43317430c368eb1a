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

//! The bin configuration: the canonical state of the stretching game.
//!
//! A `BinConf` is a sequence of bin loads kept sorted in non-increasing
//! order plus one counter per item size, with two incrementally maintained
//! Zobrist hashes (`loadhash` over (rank, load) pairs, `itemhash` over
//! (size, count) pairs). Unequal hashes imply unequal configurations, so
//! the hashes double as cheap cache keys.
//!
//! The search mutates one configuration in place and restores it on the
//! way back instead of copying per branch. Every mutating operation here
//! has an exact inverse, and the scope-guarded combinators
//! ([`BinConf::with_placed`], [`BinConf::with_probe`]) run the inverse on
//! every exit path of the closure. A single leaked increment would corrupt
//! every later hash, so prefer the combinators wherever the control flow
//! allows it.
//!
//! Re-sorting after a placement is a single adjacent-swap bubble pass:
//! only the changed load can be out of order, so restoring sortedness is
//! O(BINS), and each swap fixes the load hash with four XORs.

use crate::{
    index::BinIndex,
    problem::Problem,
    verdict::PositionValue,
    zobrist::Zobrist,
};
use smallvec::SmallVec;
use std::sync::Arc;

/// A bin configuration: sorted loads, item counters, incremental hashes,
/// and a cached position value.
///
/// Cloning is a deep value copy (hashes included) and is how a branch is
/// preserved past its mutator's stack frame — task handoff and witness
/// snapshots clone, the hot search path does not.
#[derive(Debug, Clone)]
pub struct BinConf {
    zobrist: Arc<Zobrist>,
    /// Bin loads, non-increasing. Index = rank, not identity.
    loads: SmallVec<[u32; 8]>,
    /// `items[k]` = number of items of size `k` placed so far; index 0 unused.
    items: Vec<u32>,
    loadhash: u64,
    itemhash: u64,
    value: PositionValue,
}

impl BinConf {
    /// Creates the empty configuration of a problem.
    pub fn new(problem: &Problem, zobrist: Arc<Zobrist>) -> Self {
        Self {
            zobrist,
            loads: smallvec::smallvec![0; problem.bins()],
            items: vec![0; problem.capacity() as usize + 1],
            loadhash: 0,
            itemhash: 0,
            value: PositionValue::Unknown,
        }
    }

    /// Number of bins.
    #[inline]
    pub fn bins(&self) -> usize {
        self.loads.len()
    }

    /// Largest item size, `S`.
    #[inline]
    pub fn size_limit(&self) -> u32 {
        (self.items.len() - 1) as u32
    }

    /// The sorted loads.
    #[inline]
    pub fn loads(&self) -> &[u32] {
        &self.loads
    }

    /// Load of the bin at a given rank.
    #[inline]
    pub fn load(&self, bin: BinIndex) -> u32 {
        self.loads[bin.get()]
    }

    /// Number of placed items of a given size.
    #[inline]
    pub fn item_count(&self, size: u32) -> u32 {
        self.items[size as usize]
    }

    /// Sum of all bin loads.
    #[inline]
    pub fn total_load(&self) -> u32 {
        self.loads.iter().sum()
    }

    /// Total number of items placed.
    #[inline]
    pub fn item_total(&self) -> u32 {
        self.items[1..].iter().sum()
    }

    /// The load hash (XOR over (rank, load) keys).
    #[inline]
    pub fn loadhash(&self) -> u64 {
        self.loadhash
    }

    /// The item hash (XOR over (size, count) keys). This alone keys the
    /// feasibility oracle's cache.
    #[inline]
    pub fn itemhash(&self) -> u64 {
        self.itemhash
    }

    /// Combined key for the full-search transposition table.
    #[inline]
    pub fn key(&self) -> u64 {
        self.loadhash ^ self.itemhash
    }

    /// The cached position value.
    #[inline]
    pub fn value(&self) -> PositionValue {
        self.value
    }

    /// Sets the cached position value.
    #[inline]
    pub fn set_value(&mut self, value: PositionValue) {
        self.value = value;
    }

    /// The shared Zobrist tables this configuration hashes with.
    #[inline]
    pub fn zobrist(&self) -> &Arc<Zobrist> {
        &self.zobrist
    }

    /// Places one item of `size` into the bin currently at rank `bin` and
    /// restores the non-increasing load order. Returns the rank the
    /// loaded bin ended up at; [`BinConf::remove`] takes that rank to
    /// undo the placement exactly.
    ///
    /// # Panics
    ///
    /// Panics (via table bounds) if the new load exceeds the stretched
    /// target; callers must check the terminal condition before placing.
    pub fn place(&mut self, size: u32, bin: BinIndex) -> BinIndex {
        debug_assert!(
            size >= 1 && size <= self.size_limit(),
            "called `BinConf::place` with item size {} outside 1..={}",
            size,
            self.size_limit()
        );

        let count = self.items[size as usize];
        self.itemhash ^=
            self.zobrist.item_key(size, count) ^ self.zobrist.item_key(size, count + 1);
        self.items[size as usize] = count + 1;

        let b = bin.get();
        self.loadhash ^= self.zobrist.load_key(b, self.loads[b]);
        self.loads[b] += size;
        self.loadhash ^= self.zobrist.load_key(b, self.loads[b]);

        // Only the increased load can be out of order: bubble it up.
        let mut i = b;
        while i > 0 && self.loads[i - 1] < self.loads[i] {
            let (above, below) = (self.loads[i - 1], self.loads[i]);
            self.loadhash ^= self.zobrist.load_key(i - 1, above)
                ^ self.zobrist.load_key(i, below)
                ^ self.zobrist.load_key(i - 1, below)
                ^ self.zobrist.load_key(i, above);
            self.loads.swap(i - 1, i);
            i -= 1;
        }
        BinIndex::new(i)
    }

    /// Undoes a [`BinConf::place`] of `size` whose item landed at rank
    /// `bin`, restoring the exact prior state (hashes included). Returns
    /// the rank the unloaded bin sank to.
    pub fn remove(&mut self, size: u32, bin: BinIndex) -> BinIndex {
        let b = bin.get();
        debug_assert!(
            self.loads[b] >= size,
            "called `BinConf::remove` with size {} but rank {} only holds {}",
            size,
            b,
            self.loads[b]
        );

        self.loadhash ^= self.zobrist.load_key(b, self.loads[b]);
        self.loads[b] -= size;
        self.loadhash ^= self.zobrist.load_key(b, self.loads[b]);

        // The decreased load can only sink: bubble it down.
        let last = self.loads.len() - 1;
        let mut i = b;
        while i < last && self.loads[i + 1] > self.loads[i] {
            let (above, below) = (self.loads[i], self.loads[i + 1]);
            self.loadhash ^= self.zobrist.load_key(i, above)
                ^ self.zobrist.load_key(i + 1, below)
                ^ self.zobrist.load_key(i, below)
                ^ self.zobrist.load_key(i + 1, above);
            self.loads.swap(i, i + 1);
            i += 1;
        }

        let count = self.items[size as usize];
        debug_assert!(
            count > 0,
            "called `BinConf::remove` for size {} with zero recorded items",
            size
        );
        self.itemhash ^=
            self.zobrist.item_key(size, count) ^ self.zobrist.item_key(size, count - 1);
        self.items[size as usize] = count - 1;

        BinIndex::new(i)
    }

    /// Records one more item of `size` without touching any load — the
    /// feasibility oracle's speculative probe. Must be undone with
    /// [`BinConf::remove_item`].
    #[inline]
    pub fn add_item(&mut self, size: u32) {
        debug_assert!(size >= 1 && size <= self.size_limit());
        let count = self.items[size as usize];
        self.itemhash ^=
            self.zobrist.item_key(size, count) ^ self.zobrist.item_key(size, count + 1);
        self.items[size as usize] = count + 1;
    }

    /// Undoes an [`BinConf::add_item`].
    #[inline]
    pub fn remove_item(&mut self, size: u32) {
        let count = self.items[size as usize];
        debug_assert!(
            count > 0,
            "called `BinConf::remove_item` for size {} with zero recorded items",
            size
        );
        self.itemhash ^=
            self.zobrist.item_key(size, count) ^ self.zobrist.item_key(size, count - 1);
        self.items[size as usize] = count - 1;
    }

    /// Runs `f` with the item placed, then removes it again regardless of
    /// how `f` returns. The closure receives the mutated configuration
    /// and the rank the item landed at.
    #[inline]
    pub fn with_placed<R>(
        &mut self,
        size: u32,
        bin: BinIndex,
        f: impl FnOnce(&mut Self, BinIndex) -> R,
    ) -> R {
        let rank = self.place(size, bin);
        let result = f(self, rank);
        self.remove(size, rank);
        result
    }

    /// Runs `f` with one probe item of `size` counted, then uncounts it.
    #[inline]
    pub fn with_probe<R>(&mut self, size: u32, f: impl FnOnce(&mut Self) -> R) -> R {
        self.add_item(size);
        let result = f(self);
        self.remove_item(size);
        result
    }

    /// Full consistency check: sortedness, the load/item sum invariant,
    /// and both hashes against a from-scratch recomputation. Meant for
    /// tests and debug assertions, not the hot path.
    pub fn is_consistent(&self) -> bool {
        let sorted = self.loads.windows(2).all(|w| w[0] >= w[1]);
        let item_mass: u32 = self
            .items
            .iter()
            .enumerate()
            .map(|(size, count)| size as u32 * count)
            .sum();
        sorted
            && item_mass == self.total_load()
            && self.loadhash == self.recompute_loadhash()
            && self.itemhash == self.recompute_itemhash()
    }

    fn recompute_loadhash(&self) -> u64 {
        self.loads
            .iter()
            .enumerate()
            .fold(0, |acc, (bin, &load)| acc ^ self.zobrist.load_key(bin, load))
    }

    fn recompute_itemhash(&self) -> u64 {
        self.items
            .iter()
            .enumerate()
            .skip(1)
            .fold(0, |acc, (size, &count)| {
                acc ^ self.zobrist.item_key(size as u32, count)
            })
    }
}

impl PartialEq for BinConf {
    /// Load-wise and item-wise equality; the cached value and the table
    /// handle do not participate.
    fn eq(&self, other: &Self) -> bool {
        self.loads == other.loads && self.items == other.items
    }
}

impl Eq for BinConf {}

impl std::fmt::Display for BinConf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, load) in self.loads.iter().enumerate() {
            if i > 0 {
                write!(f, "-")?;
            }
            write!(f, "{}", load)?;
        }
        write!(f, " [")?;
        for (i, count) in self.items.iter().enumerate().skip(1) {
            if i > 1 {
                write!(f, " ")?;
            }
            write!(f, "{}", count)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conf() -> BinConf {
        let problem = Problem::new(5, 7, 3).expect("valid problem");
        let zobrist = Arc::new(Zobrist::new(&problem));
        BinConf::new(&problem, zobrist)
    }

    #[test]
    fn test_empty_configuration_hashes_to_zero() {
        let c = conf();
        assert_eq!(c.loadhash(), 0);
        assert_eq!(c.itemhash(), 0);
        assert_eq!(c.key(), 0);
        assert!(c.is_consistent());
    }

    #[test]
    fn test_place_keeps_loads_sorted_and_hashes_incremental() {
        let mut c = conf();
        // Place into the last bin so the load has to bubble to the front.
        let rank = c.place(4, BinIndex::new(2));
        assert_eq!(rank.get(), 0);
        assert_eq!(c.loads(), &[4, 0, 0]);
        assert!(c.is_consistent());

        let rank = c.place(2, BinIndex::new(2));
        assert_eq!(rank.get(), 1);
        assert_eq!(c.loads(), &[4, 2, 0]);
        assert!(c.is_consistent());

        // Growing the middle bin past the front one reorders again.
        let rank = c.place(3, BinIndex::new(1));
        assert_eq!(rank.get(), 0);
        assert_eq!(c.loads(), &[5, 4, 0]);
        assert_eq!(c.item_count(3), 1);
        assert!(c.is_consistent());
    }

    #[test]
    fn test_remove_is_the_exact_inverse_of_place() {
        let mut c = conf();
        c.place(4, BinIndex::new(0));
        c.place(2, BinIndex::new(1));

        let before = c.clone();
        let (loadhash, itemhash) = (c.loadhash(), c.itemhash());

        let rank = c.place(3, BinIndex::new(1));
        assert_ne!(c.loadhash(), loadhash);
        c.remove(3, rank);

        assert_eq!(c, before);
        assert_eq!(c.loadhash(), loadhash);
        assert_eq!(c.itemhash(), itemhash);
        assert!(c.is_consistent());
    }

    #[test]
    fn test_incremental_hash_matches_scratch_after_any_prefix() {
        // Hash-consistency property: after every operation of a mixed
        // add/remove sequence, the incremental hashes must equal a
        // from-scratch recomputation of the current state.
        let mut c = conf();
        let script: &[(u32, usize)] = &[(5, 0), (1, 1), (1, 2), (3, 1), (2, 2)];
        let mut ranks = Vec::new();
        for &(size, bin) in script {
            ranks.push((size, c.place(size, BinIndex::new(bin))));
            assert!(c.is_consistent(), "inconsistent after placing {}", size);
        }
        while let Some((size, rank)) = ranks.pop() {
            c.remove(size, rank);
            assert!(c.is_consistent(), "inconsistent after removing {}", size);
        }
        assert_eq!(c.total_load(), 0);
        assert_eq!(c.key(), 0);
    }

    #[test]
    fn test_probe_items_only_touch_the_item_hash() {
        let mut c = conf();
        c.place(4, BinIndex::new(0));
        let loadhash = c.loadhash();
        let itemhash = c.itemhash();

        let seen = c.with_probe(2, |c| {
            assert_eq!(c.item_count(2), 1);
            assert_eq!(c.loadhash(), loadhash);
            c.itemhash()
        });
        assert_ne!(seen, itemhash);
        assert_eq!(c.itemhash(), itemhash);
        assert_eq!(c.item_count(2), 0);
        assert!(c.is_consistent());
    }

    #[test]
    fn test_with_placed_restores_on_every_exit() {
        let mut c = conf();
        c.place(3, BinIndex::new(0));
        let before = c.clone();

        // Early-return style exit paths inside the closure still restore.
        let r: Option<u32> = c.with_placed(2, BinIndex::new(1), |c, rank| {
            if c.load(rank) > 1 {
                return None;
            }
            Some(c.load(rank))
        });
        assert_eq!(r, None);
        assert_eq!(c, before);
        assert!(c.is_consistent());
    }

    #[test]
    fn test_equal_loads_produce_equal_hashes_regardless_of_path() {
        // Two move orders reaching the same multiset of loads and items
        // must agree on both hashes (the cache key is path-independent).
        let mut a = conf();
        a.place(4, BinIndex::new(0));
        a.place(2, BinIndex::new(1));

        let mut b = conf();
        b.place(2, BinIndex::new(0));
        b.place(4, BinIndex::new(1));

        assert_eq!(a, b);
        assert_eq!(a.loadhash(), b.loadhash());
        assert_eq!(a.itemhash(), b.itemhash());
        assert_eq!(a.key(), b.key());
    }
}
