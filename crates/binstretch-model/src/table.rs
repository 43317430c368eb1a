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

//! Fixed-size concurrent transposition table.
//!
//! Both caches of the solver are instances of this one structure: the
//! game cache maps `loadhash ^ itemhash` to a verdict, the feasibility
//! cache maps `itemhash` alone to a yes/no answer. The table is a flat
//! array of `1 << hash_bits` buckets indexed by the low bits of the
//! 64-bit key, guarded by `1 << shard_bits` mutexes each covering a
//! contiguous range of buckets, so unrelated probes rarely contend.
//!
//! The table is a *cache*, not a map: a bucket chain holds at most
//! `chain_limit` entries and an insert into a full chain is dropped.
//! Losing an entry only costs recomputation. A lookup compares the full
//! 64-bit key, so a hit is correct up to Zobrist key collisions, which
//! the search accepts by construction.

use crate::config::SolverConfig;
use smallvec::SmallVec;
use std::sync::Mutex;

#[derive(Debug)]
struct Bucket<V> {
    entries: SmallVec<[(u64, V); 4]>,
}

/// A sharded fixed-capacity cache from 64-bit Zobrist keys to values.
#[derive(Debug)]
pub struct TransTable<V> {
    shards: Vec<Mutex<Vec<Bucket<V>>>>,
    hash_bits: u32,
    shard_bits: u32,
    chain_limit: usize,
}

impl<V: Copy> TransTable<V> {
    /// Allocates an empty table sized per the configuration.
    ///
    /// `shard_bits` is clamped to `hash_bits`, so a small table degrades
    /// to one bucket per lock instead of rejecting the configuration.
    pub fn new(config: &SolverConfig) -> Self {
        let hash_bits = config.hash_bits;
        let shard_bits = config.shard_bits.min(hash_bits);
        let shard_count = 1usize << shard_bits;
        let buckets_per_shard = 1usize << (hash_bits - shard_bits);
        let shards = (0..shard_count)
            .map(|_| {
                Mutex::new(
                    (0..buckets_per_shard)
                        .map(|_| Bucket {
                            entries: SmallVec::new(),
                        })
                        .collect(),
                )
            })
            .collect();
        Self {
            shards,
            hash_bits,
            shard_bits,
            chain_limit: config.chain_limit,
        }
    }

    /// Total number of buckets.
    #[inline]
    pub fn capacity(&self) -> usize {
        1 << self.hash_bits
    }

    #[inline]
    fn locate(&self, key: u64) -> (usize, usize) {
        // Low key bits index the bucket; the top shard_bits of the
        // bucket index select the guarding mutex.
        let bucket = (key as usize) & ((1 << self.hash_bits) - 1);
        let shard = bucket >> (self.hash_bits - self.shard_bits);
        let local = bucket & ((1 << (self.hash_bits - self.shard_bits)) - 1);
        (shard, local)
    }

    /// Looks up the value cached under `key`, if any.
    pub fn lookup(&self, key: u64) -> Option<V> {
        let (shard, local) = self.locate(key);
        let guard = match self.shards[shard].lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard[local]
            .entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(_, v)| v)
    }

    /// Caches `value` under `key`. Overwrites an existing entry for the
    /// same key; when the chain is already full the insert is dropped
    /// and the value will simply be recomputed on the next miss.
    pub fn insert(&self, key: u64, value: V) {
        let (shard, local) = self.locate(key);
        let mut guard = match self.shards[shard].lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let bucket = &mut guard[local];
        if let Some(entry) = bucket.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
            return;
        }
        if bucket.entries.len() >= self.chain_limit {
            return;
        }
        bucket.entries.push((key, value));
    }

    /// Drops every entry but keeps the allocation.
    pub fn clear(&self) {
        for shard in &self.shards {
            let mut guard = match shard.lock() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            for bucket in guard.iter_mut() {
                bucket.entries.clear();
            }
        }
    }
}
