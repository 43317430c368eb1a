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

//! Best-Fit-Decreasing bound for the maximum sendable item.
//!
//! Before paying for the dynamic program, the oracle packs the current
//! item multiset greedily. If the greedy packing succeeds, its largest
//! remaining gap is a certified lower bound for the biggest item the
//! Adversary can still send, because the same packing plus that item is
//! itself an offline witness. The binary search then only has to close
//! the interval between this bound and the trivial upper bound.

use binstretch_model::BinConf;
use smallvec::SmallVec;

/// Packs the placed items with Best Fit Decreasing into bins of the
/// offline capacity and returns the largest remaining gap, or 0 if the
/// greedy packing fails.
///
/// A failure here proves nothing (Best Fit is only a heuristic); the
/// returned 0 merely gives the binary search no head start.
pub fn best_fit_bound(conf: &BinConf) -> u32 {
    let capacity = conf.size_limit();
    let mut loads: SmallVec<[u32; 8]> = smallvec::smallvec![0; conf.bins()];

    for size in (1..=capacity).rev() {
        for _ in 0..conf.item_count(size) {
            // Best fit: the fullest bin that still takes the item.
            let slot = loads
                .iter()
                .enumerate()
                .filter(|&(_, &load)| load + size <= capacity)
                .max_by_key(|&(_, &load)| load)
                .map(|(i, _)| i);
            match slot {
                Some(i) => loads[i] += size,
                None => return 0,
            }
        }
    }

    loads
        .iter()
        .map(|&load| capacity - load)
        .max()
        .unwrap_or(0)
}
