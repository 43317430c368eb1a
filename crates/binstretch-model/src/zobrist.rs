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

//! Zobrist-style XOR key tables for incremental configuration hashing.
//!
//! Two independent tables are generated per problem: one key per
//! (bin rank, load value) pair and one per (item size, count) pair. The
//! hash of a configuration is the XOR of the keys active in its current
//! state, so changing a single load or a single counter updates the hash
//! with two XORs, and any adjacent swap during re-sorting with four.
//!
//! The keys for load 0 and count 0 are fixed to zero, which makes the
//! empty configuration hash to 0 and keeps the "XOR of active keys"
//! reading literal: an empty slot contributes nothing.
//!
//! Tables are generated from a fixed seed, so hashes are reproducible
//! across runs and across threads for the same problem.

use crate::problem::Problem;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Fixed generator seed; hashes are deterministic per problem shape.
const ZOBRIST_SEED: u64 = 0x1234_5678_9ABC_DEF0;

/// Pseudo-random key tables for the two incremental hashes of a
/// [`crate::BinConf`].
#[derive(Debug)]
pub struct Zobrist {
    /// Keys for (bin rank, load), row-major: `loads[bin * load_levels + load]`.
    loads: Vec<u64>,
    /// Keys for (item size, count), row-major: `items[size * count_levels + count]`.
    items: Vec<u64>,
    load_levels: usize,
    count_levels: usize,
}

impl Zobrist {
    /// Generates the key tables for a problem.
    ///
    /// Load keys cover `0..=R` (a stored configuration never holds a bin
    /// beyond the stretched target). Count keys cover one unit more than
    /// the maximum number of items of any size, because the feasibility
    /// oracle speculatively adds one probe item before testing.
    pub fn new(problem: &Problem) -> Self {
        let load_levels = problem.target() as usize + 1;
        let count_levels = problem.max_total_load() as usize + 2;
        let sizes = problem.capacity() as usize + 1;

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(ZOBRIST_SEED);
        let mut loads = vec![0u64; problem.bins() * load_levels];
        for (i, key) in loads.iter_mut().enumerate() {
            if i % load_levels != 0 {
                *key = rng.next_u64();
            }
        }
        let mut items = vec![0u64; sizes * count_levels];
        for (i, key) in items.iter_mut().enumerate() {
            // Row 0 is unused (there is no item of size 0) and column 0
            // must stay zero so absent counts contribute nothing.
            if i >= count_levels && i % count_levels != 0 {
                *key = rng.next_u64();
            }
        }

        Self {
            loads,
            items,
            load_levels,
            count_levels,
        }
    }

    /// Key for bin rank `bin` holding load `load`.
    ///
    /// # Panics
    ///
    /// Panics if `load` exceeds the stretched target or `bin` is out of
    /// range; both indicate a corrupted configuration.
    #[inline(always)]
    pub fn load_key(&self, bin: usize, load: u32) -> u64 {
        self.loads[bin * self.load_levels + load as usize]
    }

    /// Key for `count` placed items of size `size`.
    #[inline(always)]
    pub fn item_key(&self, size: u32, count: u32) -> u64 {
        self.items[size as usize * self.count_levels + count as usize]
    }
}
