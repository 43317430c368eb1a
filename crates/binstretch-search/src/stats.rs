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

//! Node and cache counters for the game search. Purely diagnostic; no
//! counter influences any verdict.

/// Counters accumulated by one [`crate::Minimax`] engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Adversary (item-choosing) positions visited.
    pub adversary_nodes: u64,
    /// Algorithm (bin-choosing) positions visited.
    pub algorithm_nodes: u64,
    /// Positions answered out of the game cache.
    pub cache_hits: u64,
    /// Decided positions written to the game cache.
    pub cache_inserts: u64,
}

impl SearchStatistics {
    #[inline]
    pub(crate) fn on_adversary_node(&mut self) {
        self.adversary_nodes += 1;
    }

    #[inline]
    pub(crate) fn on_algorithm_node(&mut self) {
        self.algorithm_nodes += 1;
    }

    #[inline]
    pub(crate) fn on_cache_hit(&mut self) {
        self.cache_hits += 1;
    }

    #[inline]
    pub(crate) fn on_cache_insert(&mut self) {
        self.cache_inserts += 1;
    }

    /// Folds another engine's counters into this one.
    pub fn merge(&mut self, other: &SearchStatistics) {
        self.adversary_nodes += other.adversary_nodes;
        self.algorithm_nodes += other.algorithm_nodes;
        self.cache_hits += other.cache_hits;
        self.cache_inserts += other.cache_inserts;
    }
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchStatistics(adversary nodes: {}, algorithm nodes: {}, cache hits: {}, cache inserts: {})",
            self.adversary_nodes, self.algorithm_nodes, self.cache_hits, self.cache_inserts
        )
    }
}
