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

//! Offline feasibility oracle for the bin-stretching game.
//!
//! The Adversary may only send item sequences that an optimal offline
//! packer could still fit into the bins at capacity `S`. This crate
//! answers the two questions the search asks about that constraint: "is
//! this item multiset offline-feasible?" ([`FeasibilityOracle::check_item`])
//! and "what is the largest item the Adversary may send next?"
//! ([`FeasibilityOracle::max_feasible_item`]).
//!
//! The core test is a sparse dynamic program over radix-encoded load
//! tuples (`tuple`), bracketed by a Best-Fit-Decreasing lower bound
//! (`fits`) and a cached binary search (`oracle`).

pub mod fits;
pub mod oracle;
pub mod tuple;

pub use fits::best_fit_bound;
pub use oracle::{DpStatistics, FeasibilityOracle};
