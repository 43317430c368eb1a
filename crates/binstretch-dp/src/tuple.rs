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

//! Radix encoding of offline load tuples.
//!
//! The dynamic program tracks sets of hypothetical offline packings,
//! each a tuple of bin loads in `0..=S` kept sorted non-increasing.
//! A tuple is packed into a single `u64` in base `S + 1` with index 0
//! in the least significant digit, so a queue of reachable packings is
//! just a sortable vector of integers. [`crate::oracle`] relies on
//! sorting these codes to deduplicate equal tuples by adjacency.
//!
//! Tuple validity ((S + 1)^BINS fits a `u64`) is enforced once, at
//! [`binstretch_model::Problem`] construction.

/// Encodes a load tuple into a single integer, base `radix`.
#[inline]
pub fn encode(tuple: &[u32], radix: u64) -> u64 {
    tuple
        .iter()
        .rev()
        .fold(0u64, |acc, &load| acc * radix + u64::from(load))
}

/// Decodes an integer produced by [`encode`] back into `out`.
#[inline]
pub fn decode(mut code: u64, radix: u64, out: &mut [u32]) {
    for slot in out.iter_mut() {
        *slot = (code % radix) as u32;
        code /= radix;
    }
    debug_assert_eq!(code, 0, "encoded tuple has more digits than bins");
}

/// Restores non-increasing order after `tuple[i]` was increased, by
/// bubbling the entry towards the front. Returns its final position.
#[inline]
pub fn resort_increased(tuple: &mut [u32], mut i: usize) -> usize {
    while i > 0 && tuple[i - 1] < tuple[i] {
        tuple.swap(i - 1, i);
        i -= 1;
    }
    i
}

/// Restores non-increasing order after `tuple[i]` was decreased, by
/// bubbling the entry towards the back. Returns its final position.
#[inline]
pub fn resort_decreased(tuple: &mut [u32], mut i: usize) -> usize {
    while i + 1 < tuple.len() && tuple[i + 1] > tuple[i] {
        tuple.swap(i, i + 1);
        i += 1;
    }
    i
}
